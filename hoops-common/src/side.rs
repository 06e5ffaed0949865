use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    #[derivative(Default)]
    Home,
    Away,
}

impl core::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Home => write!(f, "Home"),
            Self::Away => write!(f, "Away"),
        }
    }
}

impl core::str::FromStr for TeamSide {
    type Err = UnknownSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" | "h" => Ok(Self::Home),
            "away" | "a" => Ok(Self::Away),
            _ => Err(UnknownSide(s.to_string())),
        }
    }
}

/// `{0}` is not a team side, expected `home` or `away`
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display)]
pub struct UnknownSide(pub String);

impl std::error::Error for UnknownSide {}
