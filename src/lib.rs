pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{DirLegacyStorage, FileLedgerStorage, HttpLedgerStorage};
pub use crate::core::{
    draw::{DrawMachine, DrawPhase, DrawReport, DrawTiming},
    history::{HistoryStore, MigrationReport},
    matching::match_teams_to_candidates,
    selection::select_winners,
    shuffle::shuffled,
};
pub use utils::error::{RaffleError, Result, ValidationError};
