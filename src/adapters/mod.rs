// Adapters layer: concrete storage backends, export and console output.

pub mod console;
pub mod export;
pub mod file;
pub mod http;
pub mod memory;

pub use console::ConsoleObserver;
pub use file::{DirLegacyStorage, FileLedgerStorage};
pub use http::HttpLedgerStorage;
pub use memory::{MemoryLedgerStorage, MemoryLegacyStorage};
