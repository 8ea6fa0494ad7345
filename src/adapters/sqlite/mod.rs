use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::{oneshot, watch};

use crate::domain::model::Quote;
use crate::domain::ports::QuoteStore;
use crate::utils::error::{QuoteError, Result};

mod migrations;

use migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                tracing::error!("Failed to send shutdown to quote store thread: {}", err);
            }
            if let Err(join_err) = handle.join() {
                tracing::error!("Failed to join quote store thread: {:?}", join_err);
            }
        }
    }
}

fn load_all(conn: &Connection) -> Result<Vec<Quote>> {
    let mut stmt = conn.prepare("SELECT id, quote, author, category FROM quotes ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Quote {
            id: Some(row.get(0)?),
            text: row.get(1)?,
            author: row.get(2)?,
            category: row.get(3)?,
        })
    })?;

    let mut quotes = Vec::new();
    for row in rows {
        quotes.push(row?);
    }
    Ok(quotes)
}

fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Quote>> {
    let quote = conn
        .query_row(
            "SELECT id, quote, author, category FROM quotes WHERE id = ?1",
            params![id],
            |row| {
                Ok(Quote {
                    id: Some(row.get(0)?),
                    text: row.get(1)?,
                    author: row.get(2)?,
                    category: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(quote)
}

/// SQLite-backed quote list. All statements run on one dedicated thread that
/// owns the connection; change notifications are published from that thread
/// so observers see snapshots in commit order.
#[derive(Clone)]
pub struct SqliteQuoteStore {
    inner: Arc<DatabaseInner>,
    db_path: Option<Arc<PathBuf>>,
    changes: Arc<watch::Sender<Vec<Quote>>>,
}

impl SqliteQuoteStore {
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path_for_thread = db_path.clone();
        let store = Self::spawn(move || Connection::open(&path_for_thread), Some(db_path))?;

        if let Some(path) = store.path() {
            tracing::info!("Quote store opened at {}", path.display());
        }
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::spawn(Connection::open_in_memory, None)
    }

    fn spawn<F>(opener: F, db_path: Option<PathBuf>) -> Result<Self>
    where
        F: FnOnce() -> rusqlite::Result<Connection> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Vec<Quote>>>();

        let worker = thread::Builder::new()
            .name("quote-store".into())
            .spawn(move || {
                let mut conn = match opener() {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(QuoteError::from(err)));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    tracing::warn!("Failed to enable WAL mode: {}", err);
                }

                let init_result = run_migrations(&mut conn).and_then(|_| load_all(&conn));
                if ready_tx.send(init_result).is_err() {
                    tracing::error!("Quote store opener dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => task(&mut conn),
                        DbCommand::Shutdown => break,
                    }
                }

                tracing::debug!("Quote store thread shutting down");
            })?;

        let initial = ready_rx
            .recv()
            .map_err(|_| QuoteError::store("quote store thread exited before signaling readiness"))??;

        let (changes, _) = watch::channel(initial);

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: db_path.map(Arc::new),
            changes: Arc::new(changes),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref().map(PathBuf::as_path)
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                tracing::debug!("Quote store caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| QuoteError::store(format!("failed to reach quote store thread: {}", err)))?;

        reply_rx
            .await
            .map_err(|_| QuoteError::store("quote store thread terminated unexpectedly"))?
    }
}

#[async_trait]
impl QuoteStore for SqliteQuoteStore {
    async fn insert(&self, quote: &Quote) -> Result<Quote> {
        let record = quote.clone();
        let changes = Arc::clone(&self.changes);
        self.execute(move |conn| {
            if let Some(id) = record.id {
                if let Some(existing) = find_by_id(conn, id)? {
                    return Ok(existing);
                }
            }

            conn.execute(
                "INSERT INTO quotes (quote, author, category) VALUES (?1, ?2, ?3)",
                params![record.text, record.author, record.category],
            )?;
            let stored = Quote {
                id: Some(conn.last_insert_rowid()),
                ..record
            };

            changes.send_replace(load_all(conn)?);
            Ok(stored)
        })
        .await
    }

    async fn delete(&self, quote: &Quote) -> Result<bool> {
        let record = quote.clone();
        let changes = Arc::clone(&self.changes);
        self.execute(move |conn| {
            let removed = match record.id {
                Some(id) => conn.execute("DELETE FROM quotes WHERE id = ?1", params![id])?,
                None => conn.execute(
                    "DELETE FROM quotes WHERE id = (
                         SELECT id FROM quotes
                         WHERE quote = ?1 AND author = ?2 AND category = ?3
                         ORDER BY id LIMIT 1
                     )",
                    params![record.text, record.author, record.category],
                )?,
            };

            if removed > 0 {
                changes.send_replace(load_all(conn)?);
            }
            Ok(removed > 0)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Quote>> {
        self.execute(|conn| load_all(conn)).await
    }

    fn observe_all(&self) -> watch::Receiver<Vec<Quote>> {
        self.changes.subscribe()
    }
}
