use crate::domain::model::Quote;
use crate::domain::ports::QuoteStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

struct Rows {
    quotes: Vec<Quote>,
    next_id: i64,
}

/// Non-durable store for `--ephemeral` sessions and tests.
pub struct MemoryQuoteStore {
    rows: Mutex<Rows>,
    changes: watch::Sender<Vec<Quote>>,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            rows: Mutex::new(Rows {
                quotes: Vec::new(),
                next_id: 1,
            }),
            changes,
        }
    }
}

impl Default for MemoryQuoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteStore for MemoryQuoteStore {
    async fn insert(&self, quote: &Quote) -> Result<Quote> {
        let mut rows = self.rows.lock().await;

        if let Some(id) = quote.id {
            if let Some(existing) = rows.quotes.iter().find(|q| q.id == Some(id)) {
                return Ok(existing.clone());
            }
        }

        let stored = Quote {
            id: Some(rows.next_id),
            ..quote.clone()
        };
        rows.next_id += 1;
        rows.quotes.push(stored.clone());
        self.changes.send_replace(rows.quotes.clone());
        Ok(stored)
    }

    async fn delete(&self, quote: &Quote) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        match rows.quotes.iter().position(|q| q.same_record(quote)) {
            Some(index) => {
                rows.quotes.remove(index);
                self.changes.send_replace(rows.quotes.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_all(&self) -> Result<Vec<Quote>> {
        Ok(self.rows.lock().await.quotes.clone())
    }

    fn observe_all(&self) -> watch::Receiver<Vec<Quote>> {
        self.changes.subscribe()
    }
}
