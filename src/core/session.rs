use crate::core::colors::derive_colors;
use crate::domain::model::{Quote, Rgb, SessionState};
use crate::domain::ports::{QuoteSource, QuoteStore};
use crate::utils::error::QuoteError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How overlapping `fetch_random_quote` calls resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPolicy {
    /// Every fetch applies its own result; the last one to complete wins.
    #[default]
    Overlapping,
    /// Only the most recently issued fetch may apply its result.
    LatestOnly,
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub fetch_policy: FetchPolicy,
    /// Also write store failures into `SessionState::error` (they are always logged).
    pub surface_store_errors: bool,
    /// Fixed seed for color draws; entropy when `None`.
    pub rng_seed: Option<u64>,
}

/// Background work started by a session command. Dropping it does not cancel the work.
#[derive(Debug)]
pub struct CommandHandle(JoinHandle<()>);

impl CommandHandle {
    pub async fn wait(self) {
        if let Err(e) = self.0.await {
            tracing::error!("Session command task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

struct Shared {
    state: watch::Sender<SessionState>,
    source: Arc<dyn QuoteSource>,
    store: Arc<dyn QuoteStore>,
    rng: Mutex<StdRng>,
    generation: AtomicU64,
    options: SessionOptions,
}

impl Shared {
    fn draw_colors(&self) -> (Rgb, Rgb) {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        derive_colors(&mut *rng)
    }

    async fn run_fetch(&self, generation: u64) {
        let result = self.source.fetch_random().await;

        if self.options.fetch_policy == FetchPolicy::LatestOnly
            && self.generation.load(Ordering::SeqCst) != generation
        {
            tracing::debug!(generation, "Discarding result of superseded fetch");
            return;
        }

        match result {
            Ok(items) => match items.into_iter().next() {
                Some(first) => {
                    let quote = Quote::from(first);
                    let (background, text) = self.draw_colors();
                    tracing::info!(author = %quote.author, category = %quote.category, "Fetched quote");
                    self.state.send_modify(|state| {
                        state.current_quote = Some(quote);
                        state.is_loading = false;
                        state.error = None;
                        state.background_color = background;
                        state.text_color = text;
                    });
                }
                None => {
                    tracing::warn!("Quote API returned an empty list, keeping current quote");
                    self.state.send_modify(|state| state.is_loading = false);
                }
            },
            Err(e) => {
                tracing::warn!("Quote fetch failed: {}", e);
                let message = e.to_string();
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = Some(message);
                });
            }
        }
    }

    fn store_failed(&self, action: &str, error: QuoteError) {
        tracing::error!(
            "Failed to {} quote: {} ({})",
            action,
            error,
            error.recovery_suggestion()
        );
        if self.options.surface_store_errors {
            let message = error.to_string();
            self.state.send_modify(|state| state.error = Some(message));
        }
    }
}

/// Owns the session state and mediates between commands, the quote source
/// and the quote store.
///
/// Must be created inside a tokio runtime: construction spawns the store
/// subscription and the first fetch.
pub struct QuoteSessionManager {
    shared: Arc<Shared>,
    subscription: Mutex<Option<JoinHandle<()>>>,
    startup: Mutex<Option<CommandHandle>>,
}

impl QuoteSessionManager {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        store: Arc<dyn QuoteStore>,
        options: SessionOptions,
    ) -> Self {
        let rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut saved = store.observe_all();
        let initial = SessionState {
            saved_quotes: saved.borrow_and_update().clone(),
            ..SessionState::default()
        };
        let (state, _) = watch::channel(initial);

        let shared = Arc::new(Shared {
            state,
            source,
            store,
            rng: Mutex::new(rng),
            generation: AtomicU64::new(0),
            options,
        });

        let subscription = tokio::spawn(follow_store(Arc::clone(&shared), saved));

        let manager = Self {
            shared,
            subscription: Mutex::new(Some(subscription)),
            startup: Mutex::new(None),
        };

        let first_fetch = manager.fetch_random_quote();
        if let Ok(mut startup) = manager.startup.lock() {
            *startup = Some(first_fetch);
        }

        tracing::debug!("Quote session started");
        manager
    }

    /// Waits for the fetch issued at construction. Returns immediately on later calls.
    pub async fn ready(&self) {
        let handle = match self.startup.lock() {
            Ok(mut startup) => startup.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.wait().await;
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    pub fn fetch_random_quote(&self) -> CommandHandle {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.state.send_modify(|state| state.is_loading = true);
        tracing::debug!(generation, "Fetching random quote");

        let shared = Arc::clone(&self.shared);
        CommandHandle(tokio::spawn(async move {
            shared.run_fetch(generation).await;
        }))
    }

    /// Stores the current quote. `None` when there is nothing to save.
    pub fn save_current_quote(&self) -> Option<CommandHandle> {
        let quote = self.shared.state.borrow().current_quote.clone()?;

        let shared = Arc::clone(&self.shared);
        Some(CommandHandle(tokio::spawn(async move {
            match shared.store.insert(&quote).await {
                Ok(saved) => tracing::info!(id = ?saved.id, "Saved quote by {}", saved.author),
                Err(e) => shared.store_failed("save", e),
            }
        })))
    }

    pub fn delete_quote(&self, quote: Quote) -> CommandHandle {
        let shared = Arc::clone(&self.shared);
        CommandHandle(tokio::spawn(async move {
            match shared.store.delete(&quote).await {
                Ok(true) => tracing::info!(id = ?quote.id, "Deleted quote by {}", quote.author),
                Ok(false) => tracing::debug!(id = ?quote.id, "No saved quote matched delete"),
                Err(e) => shared.store_failed("delete", e),
            }
        }))
    }

    /// Displays `quote` with a fresh random color pair.
    pub fn show_quote(&self, quote: Quote) {
        let (background, text) = self.shared.draw_colors();
        self.shared.state.send_modify(|state| {
            state.current_quote = Some(quote);
            state.background_color = background;
            state.text_color = text;
        });
    }

    /// Stops following the store. Commands keep working; `saved_quotes` freezes.
    pub fn shutdown(&self) {
        let handle = match self.subscription.lock() {
            Ok(mut subscription) => subscription.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("Quote session subscription stopped");
        }
    }
}

impl Drop for QuoteSessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn follow_store(shared: Arc<Shared>, mut saved: watch::Receiver<Vec<Quote>>) {
    while saved.changed().await.is_ok() {
        let quotes = saved.borrow_and_update().clone();
        tracing::debug!(count = quotes.len(), "Saved quotes changed");
        shared.state.send_modify(|state| state.saved_quotes = quotes);
    }
    tracing::debug!("Quote store feed closed");
}
