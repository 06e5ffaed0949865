use derivative::Derivative;
pub use hoops_common::config::GameSettings;
use serde_derive::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Derivative, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Debug, Default)]
#[serde(default)]
pub struct TickerSettings {
    /// Time between clock ticks while the clock is running
    #[derivative(Default(value = "1000"))]
    pub cadence_ms: u64,
}

impl TickerSettings {
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms.max(1))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the game, roster and team files live. Platform dependent when unset.
    pub data_dir: Option<PathBuf>,
    pub game: GameSettings,
    pub ticker: TickerSettings,
}
