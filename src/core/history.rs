use crate::domain::model::{DrawRecord, HistoryLedger, HistoryRecord, MatchRecord};
use crate::domain::ports::{LedgerStorage, LegacyStorage};
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use std::collections::HashSet;

/// Legacy key holding regular draw records.
pub const LEGACY_REGULAR_KEY: &str = "regularRaffleHistory";
/// Legacy key holding team matching records.
pub const LEGACY_TEAM_MATCHING_KEY: &str = "raffleHistory";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub regular_migrated: usize,
    pub team_matching_migrated: usize,
    pub keys_removed: Vec<String>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.regular_migrated == 0 && self.team_matching_migrated == 0 && self.keys_removed.is_empty()
    }
}

/// Append-only history of finished draws on top of a [`LedgerStorage`].
///
/// Every write is a full read-modify-write of the ledger document with no
/// locking; the last writer wins.
pub struct HistoryStore<L: LedgerStorage> {
    storage: L,
}

impl<L: LedgerStorage> HistoryStore<L> {
    pub fn new(storage: L) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &L {
        &self.storage
    }

    /// 讀取整份歷史；文件不存在時回傳空的 ledger
    pub async fn load(&self) -> Result<HistoryLedger> {
        match self.storage.read().await? {
            Some(document) => Ok(serde_json::from_value(document)?),
            None => {
                tracing::debug!("No history document yet, starting empty");
                Ok(HistoryLedger::default())
            }
        }
    }

    /// Loads the ledger, logging and masking any failure behind an empty one.
    pub async fn load_or_default(&self) -> HistoryLedger {
        match self.load().await {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::error!("❌ Error loading raffle histories: {}", e);
                HistoryLedger::default()
            }
        }
    }

    pub async fn save(&self, ledger: &HistoryLedger) -> Result<()> {
        let document = serde_json::to_value(ledger)?;
        self.storage.write(&document).await
    }

    /// 讀取、插入最前面、整份寫回
    ///
    /// A ledger that fails to load is never overwritten.
    pub async fn append(&self, record: HistoryRecord) -> Result<()> {
        let kind = record.kind();
        let id = record.id().to_string();

        let mut ledger = self.load().await?;
        ledger.prepend(record);
        self.save(&ledger).await?;

        tracing::info!("💾 Saved {} draw {} ({} in history)", kind, id, ledger.len(kind));
        Ok(())
    }

    /// One-time move of legacy per-kind records into the unified ledger.
    ///
    /// Legacy records are placed ahead of the existing ones; records whose id is
    /// already in the ledger are skipped, so an interrupted run can be repeated.
    /// The legacy keys are removed only after the merged ledger has been
    /// written. Every key removal is attempted; the first failure is returned.
    pub async fn migrate_legacy<G: LegacyStorage + ?Sized>(&self, legacy: &G) -> Result<MigrationReport> {
        let regular: Vec<DrawRecord> = read_legacy(legacy, LEGACY_REGULAR_KEY).await?;
        let team_matching: Vec<MatchRecord> = read_legacy(legacy, LEGACY_TEAM_MATCHING_KEY).await?;

        if regular.is_empty() && team_matching.is_empty() {
            tracing::debug!("No legacy histories to migrate");
            return Ok(MigrationReport::default());
        }

        let mut ledger = self.load().await?;
        let regular = not_in_ledger(regular, &ledger.regular, |r| r.id.as_str());
        let team_matching = not_in_ledger(team_matching, &ledger.team_matching, |r| r.id.as_str());

        let mut report = MigrationReport {
            regular_migrated: regular.len(),
            team_matching_migrated: team_matching.len(),
            keys_removed: Vec::new(),
        };

        if !regular.is_empty() || !team_matching.is_empty() {
            ledger.regular = regular
                .into_iter()
                .chain(std::mem::take(&mut ledger.regular))
                .collect();
            ledger.team_matching = team_matching
                .into_iter()
                .chain(std::mem::take(&mut ledger.team_matching))
                .collect();
            self.save(&ledger).await?;
        } else {
            tracing::debug!("Legacy records already present in history, only clearing legacy keys");
        }

        let mut first_error = None;
        for key in [LEGACY_REGULAR_KEY, LEGACY_TEAM_MATCHING_KEY] {
            match legacy.remove(key).await {
                Ok(()) => report.keys_removed.push(key.to_string()),
                Err(e) => {
                    tracing::error!("❌ Failed to remove legacy key {}: {}", key, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        tracing::info!(
            "✅ Successfully migrated existing raffle histories ({} regular, {} team matching)",
            report.regular_migrated,
            report.team_matching_migrated
        );
        Ok(report)
    }
}

fn not_in_ledger<T>(legacy: Vec<T>, existing: &[T], id: impl Fn(&T) -> &str) -> Vec<T> {
    let seen: HashSet<&str> = existing.iter().map(&id).collect();
    legacy.into_iter().filter(|r| !seen.contains(id(r))).collect()
}

async fn read_legacy<G, T>(legacy: &G, key: &str) -> Result<Vec<T>>
where
    G: LegacyStorage + ?Sized,
    T: DeserializeOwned,
{
    match legacy.get(key).await? {
        Some(blob) => Ok(serde_json::from_str(&blob)?),
        None => Ok(Vec::new()),
    }
}
