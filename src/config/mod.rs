#[cfg(feature = "cli")]
pub mod cli;
pub mod leagues;
pub mod toml_config;

use crate::core::draw::DrawTiming;
use crate::domain::ports::ConfigProvider;

pub const DEFAULT_HISTORY_FILE: &str = "./raffle-histories.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageSettings {
    File { path: String },
    Http { endpoint: String },
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub storage: StorageSettings,
    pub legacy_dir: Option<String>,
    pub leagues_file: Option<String>,
    pub timing: DrawTiming,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageSettings::File {
                path: DEFAULT_HISTORY_FILE.to_string(),
            },
            legacy_dir: None,
            leagues_file: None,
            timing: DrawTiming::default(),
        }
    }
}

impl Settings {
    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            storage: config.storage(),
            legacy_dir: config.legacy_dir().map(str::to_string),
            leagues_file: config.leagues_file().map(str::to_string),
            timing: config.timing(),
        }
    }
}
