use crate::domain::model::{Quote, QuoteResponse};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;

/// Remote source of random quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_random(&self) -> Result<Vec<QuoteResponse>>;
}

/// Durable list of saved quotes.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Persists `quote` and returns it with its assigned id.
    async fn insert(&self, quote: &Quote) -> Result<Quote>;

    /// Removes the matching row; `false` when nothing matched.
    async fn delete(&self, quote: &Quote) -> Result<bool>;

    async fn list_all(&self) -> Result<Vec<Quote>>;

    /// Full-list snapshots, re-emitted after every change. Each call opens an
    /// independent receiver that starts at the latest snapshot.
    fn observe_all(&self) -> watch::Receiver<Vec<Quote>>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn category(&self) -> Option<&str>;
    fn request_timeout(&self) -> Option<Duration>;
    fn extra_headers(&self) -> Option<&HashMap<String, String>>;
}
