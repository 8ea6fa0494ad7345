pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::HttpQuoteSource, memory::MemoryQuoteStore, sqlite::SqliteQuoteStore};
pub use config::TomlConfig;
pub use crate::core::session::{CommandHandle, FetchPolicy, QuoteSessionManager, SessionOptions};
pub use domain::model::{Quote, QuoteResponse, Rgb, SessionState};
pub use domain::ports::{QuoteSource, QuoteStore};
pub use utils::error::{QuoteError, Result};
