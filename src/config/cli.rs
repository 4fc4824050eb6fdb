use crate::config::toml_config::TomlConfig;
use crate::config::{Settings, StorageSettings, DEFAULT_HISTORY_FILE};
use crate::core::draw::DrawTiming;
use crate::domain::model::RaffleKind;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "small-raffle")]
#[command(about = "Random draws and team/candidate matching with a persistent history")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// JSON file holding the draw history
    #[arg(long, global = true)]
    pub history_file: Option<String>,

    /// Base URL of an HTTP history endpoint (overrides --history-file)
    #[arg(long, global = true)]
    pub history_endpoint: Option<String>,

    /// Directory with legacy per-kind history files to migrate
    #[arg(long, global = true)]
    pub legacy_dir: Option<String>,

    /// JSON file mapping league names to team lists
    #[arg(long, global = true)]
    pub leagues_file: Option<String>,

    /// Skip countdown and reveal pauses
    #[arg(long, global = true)]
    pub fast: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Draw winners from a list of entries
    Draw {
        #[arg(long = "entries", value_delimiter = ',', required = true)]
        entries: Vec<String>,

        #[arg(short = 'n', long, default_value_t = 1)]
        winners: usize,

        /// Write the result as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Randomly pair teams with candidates
    Match {
        #[arg(long, value_delimiter = ',', required_unless_present = "league")]
        teams: Vec<String>,

        /// Take the teams from a league in the leagues file
        #[arg(long, conflicts_with = "teams")]
        league: Option<String>,

        #[arg(long, value_delimiter = ',', required = true)]
        candidates: Vec<String>,

        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show past draws, newest first
    History {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Move legacy history files into the unified history
    Migrate,
    /// List the leagues in the leagues file
    Leagues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Regular,
    TeamMatching,
}

impl From<KindArg> for RaffleKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Regular => RaffleKind::Regular,
            KindArg::TeamMatching => RaffleKind::TeamMatching,
        }
    }
}

impl CliConfig {
    /// 以 TOML 設定為基礎，再套用命令列旗標
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                let toml = TomlConfig::from_file(path)?;
                toml.validate()?;
                tracing::info!("📁 Loaded configuration from: {}", path);
                Settings::from_provider(&toml)
            }
            None => Settings::default(),
        };

        if self.history_endpoint.is_some() || self.history_file.is_some() {
            settings.storage = self.storage();
        }
        if let Some(dir) = &self.legacy_dir {
            settings.legacy_dir = Some(dir.clone());
        }
        if let Some(file) = &self.leagues_file {
            settings.leagues_file = Some(file.clone());
        }
        if self.fast {
            settings.timing = DrawTiming::instant();
        }

        Ok(settings)
    }
}

impl ConfigProvider for CliConfig {
    fn storage(&self) -> StorageSettings {
        match &self.history_endpoint {
            Some(endpoint) => StorageSettings::Http {
                endpoint: endpoint.clone(),
            },
            None => StorageSettings::File {
                path: self
                    .history_file
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HISTORY_FILE.to_string()),
            },
        }
    }

    fn legacy_dir(&self) -> Option<&str> {
        self.legacy_dir.as_deref()
    }

    fn leagues_file(&self) -> Option<&str> {
        self.leagues_file.as_deref()
    }

    fn timing(&self) -> DrawTiming {
        if self.fast {
            DrawTiming::instant()
        } else {
            DrawTiming::default()
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.history_endpoint {
            validation::validate_url("history_endpoint", endpoint)?;
        }
        if let Some(path) = &self.history_file {
            validation::validate_path("history_file", path)?;
        }
        if let Command::History { limit, .. } = &self.command {
            validation::validate_positive_number("limit", *limit, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_draw_command() {
        let cli = CliConfig::try_parse_from([
            "small-raffle",
            "draw",
            "--entries",
            "A,B,C",
            "-n",
            "2",
            "--fast",
        ])
        .unwrap();

        match &cli.command {
            Command::Draw { entries, winners, csv } => {
                assert_eq!(entries, &["A", "B", "C"]);
                assert_eq!(*winners, 2);
                assert!(csv.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.settings().unwrap().timing, DrawTiming::instant());
    }

    #[test]
    fn test_match_requires_teams_or_league() {
        assert!(CliConfig::try_parse_from(["small-raffle", "match", "--candidates", "C1"]).is_err());
        assert!(CliConfig::try_parse_from([
            "small-raffle",
            "match",
            "--league",
            "Serie A",
            "--candidates",
            "C1"
        ])
        .is_ok());
    }

    #[test]
    fn test_flags_override_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[storage]\npath = \"./from-toml.json\"\n\n[legacy]\ndir = \"./legacy\"\n")
            .unwrap();
        let config_path = temp_file.path().to_str().unwrap();

        let cli = CliConfig::try_parse_from([
            "small-raffle",
            "--config",
            config_path,
            "migrate",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(
            settings.storage,
            StorageSettings::File {
                path: "./from-toml.json".to_string()
            }
        );
        assert_eq!(settings.legacy_dir.as_deref(), Some("./legacy"));

        let cli = CliConfig::try_parse_from([
            "small-raffle",
            "--config",
            config_path,
            "--history-endpoint",
            "http://localhost:3000",
            "migrate",
        ])
        .unwrap();
        assert!(matches!(
            cli.settings().unwrap().storage,
            StorageSettings::Http { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let cli = CliConfig::try_parse_from([
            "small-raffle",
            "--history-endpoint",
            "ftp://example.com",
            "history",
        ])
        .unwrap();
        assert!(cli.validate().is_err());
    }
}
