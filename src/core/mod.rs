pub mod draw;
pub mod history;
pub mod matching;
pub mod selection;
pub mod shuffle;

pub use crate::domain::model::{DrawOutcome, HistoryLedger, MatchResult, Pool, WinnerSet};
pub use crate::domain::ports::{DrawObserver, LedgerStorage, LegacyStorage};
pub use crate::utils::error::Result;
