use crate::domain::ports::LedgerStorage;
use crate::utils::error::{RaffleError, Result};
use reqwest::{Client, StatusCode};

const LEDGER_PATH: &str = "/raffle-histories.json";
const SAVE_PATH: &str = "/api/save-histories";

/// Ledger served by a web endpoint: GET the JSON document, POST the whole
/// ledger back.
#[derive(Debug, Clone)]
pub struct HttpLedgerStorage {
    base_url: String,
    client: Client,
}

impl HttpLedgerStorage {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl LedgerStorage for HttpLedgerStorage {
    async fn read(&self) -> Result<Option<serde_json::Value>> {
        let url = self.url(LEDGER_PATH);
        tracing::debug!("Fetching history document from: {}", url);
        let response = self.client.get(&url).send().await?;

        tracing::debug!("History fetch status: {}", response.status());
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RaffleError::persistence(format!(
                "Failed to load histories: HTTP {}",
                response.status()
            )));
        }

        Ok(Some(response.json().await?))
    }

    async fn write(&self, document: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(self.url(SAVE_PATH))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RaffleError::persistence(format!(
                "Failed to save histories: HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}
