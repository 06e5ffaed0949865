use hoops_common::{
    game_snapshot::Game,
    player::{Player, Team},
};
use log::*;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

const GAME_FILE: &str = "game.json";
const ROSTER_FILE: &str = "roster.json";
const TEAMS_FILE: &str = "teams.json";

/// Where games are saved and where the player and team registries come from
pub trait GameStore {
    /// The last saved game, if there is one
    fn load(&self) -> Result<Option<Game>>;
    fn save(&self, game: &Game) -> Result<()>;
    fn load_roster(&self) -> Result<Vec<Player>>;
    fn load_teams(&self) -> Result<Vec<Team>>;
}

/// Keeps one JSON document per record kind in a single directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        info!("Using data directory {}", dir.display());
        Ok(Self { dir })
    }

    /// The platform's data directory for this app
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "scorebox").map(|d| d.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_roster(&self, roster: &[Player]) -> Result<()> {
        self.write_json(ROSTER_FILE, &roster)
    }

    pub fn save_teams(&self, teams: &[Team]) -> Result<()> {
        self.write_json(TEAMS_FILE, &teams)
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.dir.join(name);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet", path.display());
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    /// Replaces the file in one step so a crash never leaves half a document behind
    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let tmp_path = self.dir.join(format!("{name}.tmp"));
        let contents = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&tmp_path, contents).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| StoreError::Io { path, source })
    }
}

impl GameStore for JsonFileStore {
    fn load(&self) -> Result<Option<Game>> {
        self.read_json(GAME_FILE)
    }

    fn save(&self, game: &Game) -> Result<()> {
        trace!("Saving game");
        self.write_json(GAME_FILE, game)
    }

    fn load_roster(&self) -> Result<Vec<Player>> {
        Ok(self.read_json(ROSTER_FILE)?.unwrap_or_default())
    }

    fn load_teams(&self) -> Result<Vec<Team>> {
        Ok(self.read_json(TEAMS_FILE)?.unwrap_or_default())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not read or write the JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
