use crate::domain::ports::{LedgerStorage, LegacyStorage};
use crate::utils::error::{RaffleError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct LedgerSlot {
    document: Option<serde_json::Value>,
    fail_writes: bool,
}

/// In-process ledger storage. Clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStorage {
    slot: Arc<Mutex<LedgerSlot>>,
}

impl MemoryLedgerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: serde_json::Value) -> Self {
        Self {
            slot: Arc::new(Mutex::new(LedgerSlot {
                document: Some(document),
                fail_writes: false,
            })),
        }
    }

    pub async fn document(&self) -> Option<serde_json::Value> {
        self.slot.lock().await.document.clone()
    }

    /// 模擬後端寫入失敗
    pub async fn fail_writes(&self, fail: bool) {
        self.slot.lock().await.fail_writes = fail;
    }
}

impl LedgerStorage for MemoryLedgerStorage {
    async fn read(&self) -> Result<Option<serde_json::Value>> {
        Ok(self.slot.lock().await.document.clone())
    }

    async fn write(&self, document: &serde_json::Value) -> Result<()> {
        let mut slot = self.slot.lock().await;
        if slot.fail_writes {
            return Err(RaffleError::persistence("Failed to save histories"));
        }
        slot.document = Some(document.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLegacyStorage {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    fail_remove_once: Arc<Mutex<HashSet<String>>>,
}

impl MemoryLegacyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, key: &str, blob: &str) {
        self.blobs
            .lock()
            .await
            .insert(key.to_string(), blob.to_string());
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }

    /// 下一次刪除此 key 時回傳錯誤，之後恢復正常
    pub async fn fail_next_remove(&self, key: &str) {
        self.fail_remove_once.lock().await.insert(key.to_string());
    }
}

#[async_trait]
impl LegacyStorage for MemoryLegacyStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.fail_remove_once.lock().await.remove(key) {
            return Err(RaffleError::persistence(format!("Failed to remove {}", key)));
        }
        self.blobs.lock().await.remove(key);
        Ok(())
    }
}
