use crate::config::{StorageSettings, DEFAULT_HISTORY_FILE};
use crate::core::draw::DrawTiming;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RaffleError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 單一間隔的上限 (毫秒)
const MAX_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    pub legacy: Option<LegacyConfig>,
    pub timing: Option<TimingConfig>,
    pub leagues: Option<LeaguesConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_type")]
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            r#type: default_storage_type(),
            path: None,
            endpoint: None,
        }
    }
}

fn default_storage_type() -> String {
    "file".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingConfig {
    pub countdown_tick_ms: Option<u64>,
    pub winner_reveal_ms: Option<u64>,
    pub pair_reveal_ms: Option<u64>,
    pub unassigned_reveal_ms: Option<u64>,
    pub focus_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaguesConfig {
    pub file: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RaffleError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RaffleError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HISTORY_ENDPOINT})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| RaffleError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        match self.storage.r#type.as_str() {
            "file" => {
                if let Some(path) = &self.storage.path {
                    validation::validate_path("storage.path", path)?;
                }
            }
            "http" => {
                let endpoint =
                    validation::validate_required_field("storage.endpoint", &self.storage.endpoint)?;
                validation::validate_url("storage.endpoint", endpoint)?;
            }
            other => {
                return Err(RaffleError::InvalidConfigValueError {
                    field: "storage.type".to_string(),
                    value: other.to_string(),
                    reason: "Unsupported storage type. Valid types: file, http".to_string(),
                })
            }
        }

        if let Some(legacy) = &self.legacy {
            validation::validate_path("legacy.dir", &legacy.dir)?;
        }
        if let Some(leagues) = &self.leagues {
            validation::validate_path("leagues.file", &leagues.file)?;
        }

        if let Some(timing) = &self.timing {
            let fields = [
                ("timing.countdown_tick_ms", timing.countdown_tick_ms),
                ("timing.winner_reveal_ms", timing.winner_reveal_ms),
                ("timing.pair_reveal_ms", timing.pair_reveal_ms),
                ("timing.unassigned_reveal_ms", timing.unassigned_reveal_ms),
                ("timing.focus_delay_ms", timing.focus_delay_ms),
            ];
            for (field, value) in fields {
                if let Some(ms) = value {
                    validation::validate_range(field, ms, 0, MAX_INTERVAL_MS)?;
                }
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn storage(&self) -> StorageSettings {
        match (self.storage.r#type.as_str(), &self.storage.endpoint) {
            ("http", Some(endpoint)) => StorageSettings::Http {
                endpoint: endpoint.clone(),
            },
            _ => StorageSettings::File {
                path: self
                    .storage
                    .path
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HISTORY_FILE.to_string()),
            },
        }
    }

    fn legacy_dir(&self) -> Option<&str> {
        self.legacy.as_ref().map(|l| l.dir.as_str())
    }

    fn leagues_file(&self) -> Option<&str> {
        self.leagues.as_ref().map(|l| l.file.as_str())
    }

    fn timing(&self) -> DrawTiming {
        let defaults = DrawTiming::default();
        let Some(timing) = &self.timing else {
            return defaults;
        };
        let pick = |ms: Option<u64>, fallback: Duration| ms.map(Duration::from_millis).unwrap_or(fallback);

        DrawTiming {
            countdown_tick: pick(timing.countdown_tick_ms, defaults.countdown_tick),
            winner_reveal: pick(timing.winner_reveal_ms, defaults.winner_reveal),
            pair_reveal: pick(timing.pair_reveal_ms, defaults.pair_reveal),
            unassigned_reveal: pick(timing.unassigned_reveal_ms, defaults.unassigned_reveal),
            focus_delay: pick(timing.focus_delay_ms, defaults.focus_delay),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[storage]
type = "http"
endpoint = "http://localhost:3000"

[legacy]
dir = "./legacy"

[timing]
countdown_tick_ms = 250
unassigned_reveal_ms = 0

[leagues]
file = "./leagues.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.storage(),
            StorageSettings::Http {
                endpoint: "http://localhost:3000".to_string()
            }
        );
        assert_eq!(config.legacy_dir(), Some("./legacy"));
        assert_eq!(config.leagues_file(), Some("./leagues.json"));

        let timing = config.timing();
        assert_eq!(timing.countdown_tick, Duration::from_millis(250));
        assert_eq!(timing.unassigned_reveal, Duration::ZERO);
        assert_eq!(timing.winner_reveal, Duration::from_millis(500));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.storage(),
            StorageSettings::File {
                path: DEFAULT_HISTORY_FILE.to_string()
            }
        );
        assert_eq!(config.timing(), DrawTiming::default());
        assert_eq!(config.legacy_dir(), None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SMALL_RAFFLE_TEST_ENDPOINT", "https://raffle.example.com");

        let toml_content = r#"
[storage]
type = "http"
endpoint = "${SMALL_RAFFLE_TEST_ENDPOINT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("https://raffle.example.com")
        );

        std::env::remove_var("SMALL_RAFFLE_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let missing_endpoint = TomlConfig::from_toml_str("[storage]\ntype = \"http\"\n").unwrap();
        assert!(matches!(
            missing_endpoint.validate(),
            Err(RaffleError::MissingConfigError { .. })
        ));

        let bad_type = TomlConfig::from_toml_str("[storage]\ntype = \"s3\"\n").unwrap();
        assert!(bad_type.validate().is_err());

        let slow = TomlConfig::from_toml_str("[timing]\ncountdown_tick_ms = 600000\n").unwrap();
        assert!(slow.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[storage]\ntype = \"file\"\npath = \"./data/history.json\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.storage(),
            StorageSettings::File {
                path: "./data/history.json".to_string()
            }
        );
    }
}
