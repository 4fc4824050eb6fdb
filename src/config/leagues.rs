use crate::utils::error::{RaffleError, Result, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Named groups of team names, e.g. `{ "Premier League": ["Arsenal", ...] }`.
/// Only used to pre-fill the team pool. Leagues keep the order of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueCatalog {
    leagues: IndexMap<String, Vec<String>>,
}

impl LeagueCatalog {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RaffleError::ConfigError {
            message: format!("Failed to read leagues file {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| RaffleError::ConfigError {
            message: format!("Leagues document is not a map of name to team list: {}", e),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.leagues.keys().map(String::as_str)
    }

    pub fn teams(&self, name: &str) -> Result<&[String]> {
        self.leagues
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                ValidationError::UnknownLeague {
                    name: name.to_string(),
                }
                .into()
            })
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LEAGUES: &str = r#"{
        "Süper Lig": ["Galatasaray", "Fenerbahçe", "Beşiktaş"],
        "Serie A": ["Inter", "Milan"]
    }"#;

    #[test]
    fn test_lookup_keeps_team_order() {
        let catalog = LeagueCatalog::from_json_str(LEAGUES).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Süper Lig", "Serie A"]);
        assert_eq!(
            catalog.teams("Süper Lig").unwrap(),
            &["Galatasaray", "Fenerbahçe", "Beşiktaş"]
        );
    }

    #[test]
    fn test_names_follow_document_order() {
        let catalog = LeagueCatalog::from_json_str(
            r#"{"Premier League": ["Arsenal"], "Bundesliga": ["Bayern"], "La Liga": ["Sevilla"]}"#,
        )
        .unwrap();
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["Premier League", "Bundesliga", "La Liga"]
        );
    }

    #[test]
    fn test_unknown_league() {
        let catalog = LeagueCatalog::from_json_str(LEAGUES).unwrap();
        let err = catalog.teams("La Liga").unwrap_err();
        assert!(matches!(
            err,
            RaffleError::Validation(ValidationError::UnknownLeague { .. })
        ));
    }

    #[test]
    fn test_from_file_and_bad_shape() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LEAGUES.as_bytes()).unwrap();
        assert!(!LeagueCatalog::from_file(file.path()).unwrap().is_empty());

        assert!(matches!(
            LeagueCatalog::from_json_str(r#"["not", "a", "map"]"#),
            Err(RaffleError::ConfigError { .. })
        ));
    }
}
