//! Startup-time backend selection and per-unit-of-work repository scopes.
//!
//! # Responsibility
//! - Turn `CommanderConfig` into one concrete repository backend.
//! - Apply schema migrations once, before any scope is opened.
//! - Open a fresh repository (and, for file-backed SQLite, a fresh
//!   connection) for every unit of work.
//!
//! # Invariants
//! - The backend value is immutable after bootstrap and is `Send + Sync`,
//!   so request handlers on different threads can share it.
//! - Repository instances never outlive the closure they are handed to.

use crate::config::{BackendKind, CommanderConfig, SqliteLocation};
use crate::db::{connect_db, open_db, open_db_in_memory};
use crate::repo::command_repo::{CommandRepository, RepoError, RepoResult};
use crate::repo::memory_repo::InMemoryCommandStore;
use crate::repo::mock_repo::MockCommandRepository;
use crate::repo::sql_repo::SqlCommandRepository;
use log::{info, warn};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

/// Migrated SQLite store.
pub enum SqlStore {
    /// Each scope opens its own connection to this file.
    File(PathBuf),
    /// Scopes share the connection that holds the in-memory database; one
    /// scope at a time holds the lock.
    Memory(Mutex<Connection>),
}

/// The repository backend chosen for the process.
pub enum CommandBackend {
    Mock,
    Sql(SqlStore),
    InMemory(InMemoryCommandStore),
}

impl CommandBackend {
    /// Selects the configured backend and prepares its storage.
    ///
    /// For the SQL backend this opens the store and applies pending
    /// migrations synchronously.
    ///
    /// # Side effects
    /// - Emits a `backend_bootstrap` event.
    /// - Warns with `config_defaults_in_use` when the SQL backend runs on
    ///   the development default password.
    pub fn bootstrap(config: &CommanderConfig) -> RepoResult<Self> {
        let started_at = Instant::now();

        let backend = match config.backend {
            BackendKind::Mock => Self::Mock,
            BackendKind::Memory => Self::InMemory(InMemoryCommandStore::new()),
            BackendKind::Sql => {
                if config.db.uses_default_password() {
                    warn!(
                        "event=config_defaults_in_use module=config status=warn key=DBPassword"
                    );
                }
                match config.db.sqlite_location() {
                    SqliteLocation::Memory => Self::sqlite_in_memory()?,
                    SqliteLocation::File(path) => Self::sqlite_file(path)?,
                }
            }
        };

        info!(
            "event=backend_bootstrap module=service status=ok backend={} duration_ms={}",
            backend.kind().as_str(),
            started_at.elapsed().as_millis()
        );
        Ok(backend)
    }

    /// Opens (creating if needed) and migrates a file-backed SQL store.
    pub fn sqlite_file(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let path = path.into();
        open_db(&path)?;
        Ok(Self::Sql(SqlStore::File(path)))
    }

    /// Creates and migrates a private in-memory SQL store.
    pub fn sqlite_in_memory() -> RepoResult<Self> {
        Ok(Self::Sql(SqlStore::Memory(Mutex::new(
            open_db_in_memory()?,
        ))))
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Mock => BackendKind::Mock,
            Self::Sql(_) => BackendKind::Sql,
            Self::InMemory(_) => BackendKind::Memory,
        }
    }

    /// Runs one unit of work against a fresh repository instance.
    ///
    /// Staged changes not saved by `work` are discarded when it returns.
    pub fn with_repository<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&mut dyn CommandRepository) -> RepoResult<T>,
    {
        match self {
            Self::Mock => work(&mut MockCommandRepository::new()),
            Self::Sql(SqlStore::File(path)) => {
                let conn = connect_db(path)?;
                let mut repo = SqlCommandRepository::try_new(&conn)?;
                work(&mut repo)
            }
            Self::Sql(SqlStore::Memory(conn)) => {
                let conn = conn
                    .lock()
                    .map_err(|_| RepoError::LockPoisoned("sql memory"))?;
                let mut repo = SqlCommandRepository::try_new(&conn)?;
                work(&mut repo)
            }
            Self::InMemory(store) => work(&mut store.repository()),
        }
    }
}
