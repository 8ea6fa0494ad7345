use crate::adapters::http::HttpQuoteSource;
use crate::adapters::memory::MemoryQuoteStore;
use crate::adapters::sqlite::SqliteQuoteStore;
use crate::config::TomlConfig;
use crate::core::session::QuoteSessionManager;
use crate::core::{QuoteSource, QuoteStore};
use crate::utils::error::Result;
use std::sync::Arc;

pub fn open_store(config: &TomlConfig) -> Result<Arc<dyn QuoteStore>> {
    if config.store.in_memory {
        tracing::info!("Saved quotes are kept in memory for this session only");
        return Ok(Arc::new(MemoryQuoteStore::new()));
    }
    Ok(Arc::new(SqliteQuoteStore::open(&config.store.path)?))
}

/// Wires the configured source and store into a running session.
/// Call from inside a tokio runtime.
pub fn start_session(config: &TomlConfig) -> Result<QuoteSessionManager> {
    let store = open_store(config)?;
    let source: Arc<dyn QuoteSource> = Arc::new(HttpQuoteSource::from_config(config));

    tracing::info!(
        endpoint = %config.source.endpoint,
        policy = ?config.session.fetch_policy,
        "Starting quote session"
    );

    Ok(QuoteSessionManager::new(
        source,
        store,
        config.session_options(),
    ))
}
