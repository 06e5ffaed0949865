use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Rules for a single game. Fixed once the game has been set up.
#[derive(Derivative, Clone, PartialEq, Serialize, Deserialize)]
#[derivative(Debug, Default)]
#[serde(default)]
pub struct GameSettings {
    #[derivative(Default(value = "4"))]
    pub quarters: u8,
    /// Length of a regulation quarter, in seconds
    #[derivative(Default(value = "600"))]
    pub quarter_duration: u32,
    #[derivative(Default(value = "300"))]
    pub overtime_duration: u32,
    /// Length of a quarter or overtime break. Halftime lasts twice as long.
    #[derivative(Default(value = "120"))]
    pub break_duration: u32,
    /// Team fouls in one period at which the opponent is in the bonus
    #[derivative(Default(value = "5"))]
    pub fouls_for_bonus: u16,
    #[derivative(Default(value = "5"))]
    pub max_personal_fouls: u16,
    #[derivative(Default(value = "true"))]
    pub allow_foul_outs: bool,
    #[derivative(Default(value = "5"))]
    pub timeouts_per_game: u8,
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.quarters == 0 {
            return Err(SettingsError::NoQuarters);
        }
        if self.quarter_duration == 0 {
            return Err(SettingsError::ZeroDuration("quarter"));
        }
        if self.overtime_duration == 0 {
            return Err(SettingsError::ZeroDuration("overtime"));
        }
        if self.break_duration == 0 {
            return Err(SettingsError::ZeroDuration("break"));
        }
        if self.fouls_for_bonus == 0 {
            return Err(SettingsError::ZeroBonusThreshold);
        }
        if self.allow_foul_outs && self.max_personal_fouls == 0 {
            return Err(SettingsError::ZeroFoulOutLimit);
        }
        Ok(())
    }

    pub fn quarter_secs(&self) -> f64 {
        self.quarter_duration.into()
    }

    pub fn overtime_secs(&self) -> f64 {
        self.overtime_duration.into()
    }

    pub fn break_secs(&self) -> f64 {
        self.break_duration.into()
    }

    /// Length of a playing period, regulation or overtime
    pub fn period_secs(&self, is_overtime: bool) -> f64 {
        if is_overtime {
            self.overtime_secs()
        } else {
            self.quarter_secs()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, displaydoc::Display)]
pub enum SettingsError {
    /// A game needs at least one quarter
    NoQuarters,
    /// The {0} duration must be longer than zero seconds
    ZeroDuration(&'static str),
    /// The bonus threshold must be at least one foul
    ZeroBonusThreshold,
    /// Foul-outs are enabled, so the personal foul limit must be at least one
    ZeroFoulOutLimit,
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;

    const SETTINGS_STRING: &str = indoc!(
        r#"quarters = 4
           quarter_duration = 600
           overtime_duration = 300
           break_duration = 120
           fouls_for_bonus = 5
           max_personal_fouls = 5
           allow_foul_outs = true
           timeouts_per_game = 5"#
    );

    #[test]
    fn test_deser_settings() {
        let settings: GameSettings = Default::default();
        let deser = toml::from_str(SETTINGS_STRING);
        assert_eq!(deser, Ok(settings));
    }

    #[test]
    fn test_ser_settings() {
        let settings = GameSettings {
            quarters: 2,
            quarter_duration: 1200,
            ..Default::default()
        };
        let serialized = toml::to_string(&settings).unwrap();
        let deser = toml::from_str(&serialized);
        assert_eq!(deser, Ok(settings));
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let deser: GameSettings = toml::from_str("quarters = 2").unwrap();
        assert_eq!(
            deser,
            GameSettings {
                quarters: 2,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_validate() {
        assert_eq!(GameSettings::default().validate(), Ok(()));

        let settings = GameSettings {
            quarters: 0,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::NoQuarters));

        let settings = GameSettings {
            overtime_duration: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ZeroDuration("overtime"))
        );

        let settings = GameSettings {
            max_personal_fouls: 0,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::ZeroFoulOutLimit));

        let settings = GameSettings {
            max_personal_fouls: 0,
            allow_foul_outs: false,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn test_period_secs() {
        let settings = GameSettings::default();
        assert_eq!(settings.period_secs(false), 600.0);
        assert_eq!(settings.period_secs(true), 300.0);
    }
}
