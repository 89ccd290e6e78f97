//! In-process command store with unit-of-work repositories.
//!
//! # Responsibility
//! - Hold committed commands in a shared, lock-guarded map.
//! - Give each unit of work its own change-set over that map.
//!
//! # Invariants
//! - Ids start at 1, increase monotonically, and are never reused.
//! - A batch is applied to a scratch copy and swapped in only when every
//!   change succeeded.

use crate::model::command::{Command, CommandId, NewCommand};
use crate::repo::command_repo::{
    ChangeSet, CommandRepository, PendingChange, RepoError, RepoResult, SaveSummary,
};
use log::{debug, error, info};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

#[derive(Debug, Clone)]
struct StoreState {
    rows: BTreeMap<CommandId, Command>,
    next_id: CommandId,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// Shared handle to the committed in-memory command set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommandStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryCommandStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh unit-of-work repository over this store.
    pub fn repository(&self) -> InMemoryCommandRepository {
        InMemoryCommandRepository {
            store: self.clone(),
            changes: ChangeSet::default(),
        }
    }

    /// Number of committed commands.
    pub fn len(&self) -> RepoResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|_| RepoError::LockPoisoned("read"))?;
        Ok(state.rows.len())
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Applies a batch to a scratch copy and swaps it in on success.
    fn commit(&self, changes: Vec<PendingChange>) -> RepoResult<SaveSummary> {
        let mut state = self
            .state
            .write()
            .map_err(|_| RepoError::LockPoisoned("write"))?;
        let mut scratch = (*state).clone();
        let summary = apply_changes(&mut scratch, changes)?;
        *state = scratch;
        Ok(summary)
    }
}

/// Repository over an `InMemoryCommandStore` scoped to one unit of work.
#[derive(Debug)]
pub struct InMemoryCommandRepository {
    store: InMemoryCommandStore,
    changes: ChangeSet,
}

impl InMemoryCommandRepository {
    /// Number of changes staged since the last `save_changes`.
    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }
}

impl CommandRepository for InMemoryCommandRepository {
    fn create_command(&mut self, command: NewCommand) -> RepoResult<()> {
        self.changes.stage_insert(command)
    }

    fn delete_command(&mut self, command: &Command) -> RepoResult<()> {
        self.changes.stage_delete(command.id);
        Ok(())
    }

    fn update_command(&mut self, command: &Command) -> RepoResult<()> {
        self.changes.stage_update(command)
    }

    fn get_command_by_id(&self, id: CommandId) -> RepoResult<Command> {
        let state = self
            .store
            .state
            .read()
            .map_err(|_| RepoError::LockPoisoned("read"))?;
        state.rows.get(&id).cloned().ok_or(RepoError::NotFound(id))
    }

    fn get_all_commands(&self) -> RepoResult<Vec<Command>> {
        let state = self
            .store
            .state
            .read()
            .map_err(|_| RepoError::LockPoisoned("read"))?;
        Ok(state.rows.values().cloned().collect())
    }

    fn save_changes(&mut self) -> RepoResult<SaveSummary> {
        if self.changes.is_empty() {
            debug!("event=repo_save module=repo backend=memory status=ok staged=0 rows=0");
            return Ok(SaveSummary::default());
        }

        let started_at = Instant::now();
        let changes = self.changes.take();
        let staged = changes.len();

        match self.store.commit(changes) {
            Ok(summary) => {
                info!(
                    "event=repo_save module=repo backend=memory status=ok staged={} rows={} duration_ms={}",
                    staged,
                    summary.rows_affected,
                    started_at.elapsed().as_millis()
                );
                Ok(summary)
            }
            Err(err) => {
                error!(
                    "event=repo_save module=repo backend=memory status=error staged={} duration_ms={} error={}",
                    staged,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn apply_changes(state: &mut StoreState, changes: Vec<PendingChange>) -> RepoResult<SaveSummary> {
    let mut summary = SaveSummary::default();

    for change in changes {
        match change {
            PendingChange::Insert(command) => {
                let id = state.next_id;
                state.next_id += 1;
                state.rows.insert(id, Command::from_new(id, command));
                summary.inserted_ids.push(id);
            }
            PendingChange::Update(command) => {
                let slot = state
                    .rows
                    .get_mut(&command.id)
                    .ok_or(RepoError::NotFound(command.id))?;
                *slot = command;
            }
            PendingChange::Delete(id) => {
                state.rows.remove(&id).ok_or(RepoError::NotFound(id))?;
            }
        }
        summary.rows_affected += 1;
    }

    Ok(summary)
}
