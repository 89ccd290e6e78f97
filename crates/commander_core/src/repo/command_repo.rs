//! Command repository contract and shared unit-of-work types.
//!
//! # Responsibility
//! - Define the persistence contract every command backend implements.
//! - Provide the staged change-set used by backends that batch writes.
//!
//! # Invariants
//! - `create`/`update`/`delete` only stage; nothing is durable until
//!   `save_changes` succeeds.
//! - A failed `save_changes` persists nothing from its batch.
//! - Reads never observe or mutate staged changes.

use crate::db::DbError;
use crate::model::command::{Command, CommandId, CommandValidationError, NewCommand};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for command persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// The backend deliberately does not implement this operation.
    Unsupported(&'static str),
    NotFound(CommandId),
    Validation(CommandValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    LockPoisoned(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported(operation) => {
                write!(f, "operation `{operation}` is not supported by this repository")
            }
            Self::NotFound(id) => write!(f, "command not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted command data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::LockPoisoned(operation) => {
                write!(f, "command store lock poisoned during {operation}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CommandValidationError> for RepoError {
    fn from(value: CommandValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Outcome of a successful `save_changes` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// Rows written across all flushed changes.
    pub rows_affected: usize,
    /// Ids assigned to staged creates, in staging order.
    pub inserted_ids: Vec<CommandId>,
}

impl SaveSummary {
    /// Returns whether at least one underlying change was persisted.
    pub fn persisted(&self) -> bool {
        self.rows_affected > 0
    }
}

/// Repository interface for command CRUD operations.
///
/// One instance serves one unit of work and must not be shared across
/// concurrent callers.
pub trait CommandRepository {
    /// Stages an insert. The assigned id is reported by `save_changes`.
    fn create_command(&mut self, command: NewCommand) -> RepoResult<()>;
    /// Stages removal of the record with `command.id`.
    fn delete_command(&mut self, command: &Command) -> RepoResult<()>;
    /// Stages a whole-record overwrite of the record with `command.id`.
    fn update_command(&mut self, command: &Command) -> RepoResult<()>;
    fn get_command_by_id(&self, id: CommandId) -> RepoResult<Command>;
    fn get_all_commands(&self) -> RepoResult<Vec<Command>>;
    /// Commits every staged change as one unit.
    fn save_changes(&mut self) -> RepoResult<SaveSummary>;
}

/// One staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    Insert(NewCommand),
    Update(Command),
    Delete(CommandId),
}

/// Ordered list of staged writes awaiting commit.
#[derive(Debug, Default)]
pub struct ChangeSet {
    pending: Vec<PendingChange>,
}

impl ChangeSet {
    /// Validates and stages an insert.
    pub fn stage_insert(&mut self, command: NewCommand) -> RepoResult<()> {
        command.validate()?;
        self.pending.push(PendingChange::Insert(command));
        Ok(())
    }

    /// Validates and stages a full overwrite.
    pub fn stage_update(&mut self, command: &Command) -> RepoResult<()> {
        command.validate()?;
        self.pending.push(PendingChange::Update(command.clone()));
        Ok(())
    }

    pub fn stage_delete(&mut self, id: CommandId) {
        self.pending.push(PendingChange::Delete(id));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drains the staged changes, leaving the set empty.
    pub fn take(&mut self) -> Vec<PendingChange> {
        std::mem::take(&mut self.pending)
    }
}
