use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Sequence)]
pub enum StatKey {
    #[serde(rename = "1PM")]
    FreeThrowsMade,
    #[serde(rename = "1PA")]
    FreeThrowsAttempted,
    #[serde(rename = "2PM")]
    TwoPointersMade,
    #[serde(rename = "2PA")]
    TwoPointersAttempted,
    #[serde(rename = "3PM")]
    ThreePointersMade,
    #[serde(rename = "3PA")]
    ThreePointersAttempted,
    #[serde(rename = "OREB")]
    OffensiveRebounds,
    #[serde(rename = "DREB")]
    DefensiveRebounds,
    #[serde(rename = "AST")]
    Assists,
    #[serde(rename = "STL")]
    Steals,
    #[serde(rename = "BLK")]
    Blocks,
    #[serde(rename = "TOV")]
    Turnovers,
    #[serde(rename = "PF")]
    PersonalFouls,
}

/// The three shot categories, each with a made and an attempted counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence)]
pub enum ShotCategory {
    OnePoint,
    TwoPoint,
    ThreePoint,
}

impl ShotCategory {
    pub fn made(self) -> StatKey {
        match self {
            Self::OnePoint => StatKey::FreeThrowsMade,
            Self::TwoPoint => StatKey::TwoPointersMade,
            Self::ThreePoint => StatKey::ThreePointersMade,
        }
    }

    pub fn attempted(self) -> StatKey {
        match self {
            Self::OnePoint => StatKey::FreeThrowsAttempted,
            Self::TwoPoint => StatKey::TwoPointersAttempted,
            Self::ThreePoint => StatKey::ThreePointersAttempted,
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Self::OnePoint => 1,
            Self::TwoPoint => 2,
            Self::ThreePoint => 3,
        }
    }
}

/// Which half of a shot pair a key is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    Made(ShotCategory),
    Attempted(ShotCategory),
}

impl StatKey {
    pub fn code(self) -> &'static str {
        match self {
            Self::FreeThrowsMade => "1PM",
            Self::FreeThrowsAttempted => "1PA",
            Self::TwoPointersMade => "2PM",
            Self::TwoPointersAttempted => "2PA",
            Self::ThreePointersMade => "3PM",
            Self::ThreePointersAttempted => "3PA",
            Self::OffensiveRebounds => "OREB",
            Self::DefensiveRebounds => "DREB",
            Self::Assists => "AST",
            Self::Steals => "STL",
            Self::Blocks => "BLK",
            Self::Turnovers => "TOV",
            Self::PersonalFouls => "PF",
        }
    }

    pub fn shot_kind(self) -> Option<ShotKind> {
        match self {
            Self::FreeThrowsMade => Some(ShotKind::Made(ShotCategory::OnePoint)),
            Self::FreeThrowsAttempted => Some(ShotKind::Attempted(ShotCategory::OnePoint)),
            Self::TwoPointersMade => Some(ShotKind::Made(ShotCategory::TwoPoint)),
            Self::TwoPointersAttempted => Some(ShotKind::Attempted(ShotCategory::TwoPoint)),
            Self::ThreePointersMade => Some(ShotKind::Made(ShotCategory::ThreePoint)),
            Self::ThreePointersAttempted => Some(ShotKind::Attempted(ShotCategory::ThreePoint)),
            Self::OffensiveRebounds
            | Self::DefensiveRebounds
            | Self::Assists
            | Self::Steals
            | Self::Blocks
            | Self::Turnovers
            | Self::PersonalFouls => None,
        }
    }
}

impl core::fmt::Display for StatKey {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl core::str::FromStr for StatKey {
    type Err = UnknownStatKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        enum_iterator::all::<StatKey>()
            .find(|key| key.code() == upper)
            .ok_or_else(|| UnknownStatKey(s.to_string()))
    }
}

/// `{0}` is not a known stat, expected one of 1PM 1PA 2PM 2PA 3PM 3PA OREB DREB AST STL BLK TOV PF
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display)]
pub struct UnknownStatKey(pub String);

impl std::error::Error for UnknownStatKey {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    pub fn delta(self) -> i32 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }
}

/// Box score counters for one player in one game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    #[serde(rename = "1PM")]
    pub free_throws_made: u16,
    #[serde(rename = "1PA")]
    pub free_throws_attempted: u16,
    #[serde(rename = "2PM")]
    pub two_pointers_made: u16,
    #[serde(rename = "2PA")]
    pub two_pointers_attempted: u16,
    #[serde(rename = "3PM")]
    pub three_pointers_made: u16,
    #[serde(rename = "3PA")]
    pub three_pointers_attempted: u16,
    #[serde(rename = "OREB")]
    pub offensive_rebounds: u16,
    #[serde(rename = "DREB")]
    pub defensive_rebounds: u16,
    #[serde(rename = "AST")]
    pub assists: u16,
    #[serde(rename = "STL")]
    pub steals: u16,
    #[serde(rename = "BLK")]
    pub blocks: u16,
    #[serde(rename = "TOV")]
    pub turnovers: u16,
    #[serde(rename = "PF")]
    pub personal_fouls: u16,
}

impl PlayerStats {
    pub fn get(&self, key: StatKey) -> u16 {
        match key {
            StatKey::FreeThrowsMade => self.free_throws_made,
            StatKey::FreeThrowsAttempted => self.free_throws_attempted,
            StatKey::TwoPointersMade => self.two_pointers_made,
            StatKey::TwoPointersAttempted => self.two_pointers_attempted,
            StatKey::ThreePointersMade => self.three_pointers_made,
            StatKey::ThreePointersAttempted => self.three_pointers_attempted,
            StatKey::OffensiveRebounds => self.offensive_rebounds,
            StatKey::DefensiveRebounds => self.defensive_rebounds,
            StatKey::Assists => self.assists,
            StatKey::Steals => self.steals,
            StatKey::Blocks => self.blocks,
            StatKey::Turnovers => self.turnovers,
            StatKey::PersonalFouls => self.personal_fouls,
        }
    }

    pub fn get_mut(&mut self, key: StatKey) -> &mut u16 {
        match key {
            StatKey::FreeThrowsMade => &mut self.free_throws_made,
            StatKey::FreeThrowsAttempted => &mut self.free_throws_attempted,
            StatKey::TwoPointersMade => &mut self.two_pointers_made,
            StatKey::TwoPointersAttempted => &mut self.two_pointers_attempted,
            StatKey::ThreePointersMade => &mut self.three_pointers_made,
            StatKey::ThreePointersAttempted => &mut self.three_pointers_attempted,
            StatKey::OffensiveRebounds => &mut self.offensive_rebounds,
            StatKey::DefensiveRebounds => &mut self.defensive_rebounds,
            StatKey::Assists => &mut self.assists,
            StatKey::Steals => &mut self.steals,
            StatKey::Blocks => &mut self.blocks,
            StatKey::Turnovers => &mut self.turnovers,
            StatKey::PersonalFouls => &mut self.personal_fouls,
        }
    }

    pub fn points(&self) -> u32 {
        enum_iterator::all::<ShotCategory>()
            .map(|cat| u32::from(self.get(cat.made())) * cat.points())
            .sum()
    }

    pub fn total_rebounds(&self) -> u32 {
        u32::from(self.offensive_rebounds) + u32::from(self.defensive_rebounds)
    }

    /// Every made counter is at most its attempted counter
    pub fn shots_consistent(&self) -> bool {
        enum_iterator::all::<ShotCategory>()
            .all(|cat| self.get(cat.made()) <= self.get(cat.attempted()))
    }
}
