use crate::domain::model::{DrawOutcome, Entry, MatchResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Backing store for the unified history document.
pub trait LedgerStorage: Send + Sync {
    /// `Ok(None)` 表示文件尚不存在
    fn read(&self) -> impl std::future::Future<Output = Result<Option<serde_json::Value>>> + Send;
    fn write(
        &self,
        document: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Older per-kind storage: string keys holding JSON blobs. Only read and
/// removed during migration.
#[async_trait]
pub trait LegacyStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn remove(&self, key: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn storage(&self) -> crate::config::StorageSettings;
    fn legacy_dir(&self) -> Option<&str>;
    fn leagues_file(&self) -> Option<&str>;
    fn timing(&self) -> crate::core::draw::DrawTiming;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    /// 倒數 3, 2, 1；progress 為 0..=100
    Countdown { value: u8, progress: u8 },
    /// 倒數結束，progress 固定為 100
    CountdownFinished { progress: u8 },
    WinnerRevealed { rank: usize, winner: Entry },
    PairRevealed(MatchResult),
    UnassignedRevealed { team: String },
    Completed(DrawOutcome),
    /// 給 UI 的捲動/聚焦提示
    FocusResults,
    Cancelled,
}

pub trait DrawObserver: Send + Sync {
    fn on_event(&self, event: &DrawEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DrawObserver for NoopObserver {
    fn on_event(&self, _event: &DrawEvent) {}
}

impl DrawObserver for tokio::sync::mpsc::UnboundedSender<DrawEvent> {
    fn on_event(&self, event: &DrawEvent) {
        // 接收端已關閉時直接丟棄
        let _ = self.send(event.clone());
    }
}
