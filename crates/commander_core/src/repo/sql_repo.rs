//! SQLite-backed command repository.
//!
//! # Responsibility
//! - Translate repository operations into SQL over the `Commands` table.
//! - Batch staged writes and flush them in a single transaction.
//!
//! # Invariants
//! - Writes are staged in memory; no SQL runs until `save_changes`.
//! - `save_changes` is all-or-nothing: any failing change rolls back the batch.
//! - Reads run eagerly against committed state and reject invalid rows.
//! - Construction fails on connections that have not been migrated.

use crate::db::migrations::{current_version, latest_version};
use crate::model::command::{Command, CommandId, NewCommand};
use crate::repo::command_repo::{
    ChangeSet, CommandRepository, PendingChange, RepoError, RepoResult, SaveSummary,
};
use log::{debug, error, info};
use rusqlite::{params, Connection, Row};
use std::time::Instant;

const COMMANDS_TABLE: &str = "Commands";
const REQUIRED_COLUMNS: &[&str] = &["Id", "HowTo", "Line", "Platform"];

const COMMAND_SELECT_SQL: &str = "SELECT
    Id,
    HowTo,
    Line,
    Platform
FROM Commands";

/// SQLite-backed command repository scoped to one unit of work.
pub struct SqlCommandRepository<'conn> {
    conn: &'conn Connection,
    changes: ChangeSet,
}

impl<'conn> SqlCommandRepository<'conn> {
    /// Creates a repository over a connection whose schema is up to date.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` differs from the
    ///   latest known migration.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema does
    ///   not carry the `Commands` shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        ensure_commands_schema(conn)?;

        Ok(Self {
            conn,
            changes: ChangeSet::default(),
        })
    }

    /// Number of changes staged since the last `save_changes`.
    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    fn flush(&self, changes: Vec<PendingChange>) -> RepoResult<SaveSummary> {
        // Dropping `tx` on an early return rolls the batch back.
        let tx = self.conn.unchecked_transaction()?;
        let mut summary = SaveSummary::default();

        for change in changes {
            match change {
                PendingChange::Insert(command) => {
                    let inserted = tx.execute(
                        "INSERT INTO Commands (HowTo, Line, Platform) VALUES (?1, ?2, ?3);",
                        params![
                            command.how_to.as_str(),
                            command.line.as_str(),
                            command.platform.as_str(),
                        ],
                    )?;
                    summary.rows_affected += inserted;
                    summary.inserted_ids.push(tx.last_insert_rowid());
                }
                PendingChange::Update(command) => {
                    let changed = tx.execute(
                        "UPDATE Commands
                         SET
                            HowTo = ?1,
                            Line = ?2,
                            Platform = ?3
                         WHERE Id = ?4;",
                        params![
                            command.how_to.as_str(),
                            command.line.as_str(),
                            command.platform.as_str(),
                            command.id,
                        ],
                    )?;
                    if changed == 0 {
                        return Err(RepoError::NotFound(command.id));
                    }
                    summary.rows_affected += changed;
                }
                PendingChange::Delete(id) => {
                    let changed = tx.execute("DELETE FROM Commands WHERE Id = ?1;", [id])?;
                    if changed == 0 {
                        return Err(RepoError::NotFound(id));
                    }
                    summary.rows_affected += changed;
                }
            }
        }

        tx.commit()?;
        Ok(summary)
    }
}

impl CommandRepository for SqlCommandRepository<'_> {
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
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMAND_SELECT_SQL} WHERE Id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return parse_command_row(row);
        }

        Err(RepoError::NotFound(id))
    }

    fn get_all_commands(&self) -> RepoResult<Vec<Command>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMAND_SELECT_SQL} ORDER BY Id ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut commands = Vec::new();
        while let Some(row) = rows.next()? {
            commands.push(parse_command_row(row)?);
        }

        Ok(commands)
    }

    fn save_changes(&mut self) -> RepoResult<SaveSummary> {
        if self.changes.is_empty() {
            debug!("event=repo_save module=repo backend=sql status=ok staged=0 rows=0");
            return Ok(SaveSummary::default());
        }

        let started_at = Instant::now();
        let staged = self.changes.len();
        let changes = self.changes.take();

        match self.flush(changes) {
            Ok(summary) => {
                info!(
                    "event=repo_save module=repo backend=sql status=ok staged={} rows={} duration_ms={}",
                    staged,
                    summary.rows_affected,
                    started_at.elapsed().as_millis()
                );
                Ok(summary)
            }
            Err(err) => {
                error!(
                    "event=repo_save module=repo backend=sql status=error staged={} duration_ms={} error={}",
                    staged,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn ensure_commands_schema(conn: &Connection) -> RepoResult<()> {
    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [COMMANDS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(COMMANDS_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({COMMANDS_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;

    for &required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column.eq_ignore_ascii_case(required)) {
            return Err(RepoError::MissingRequiredColumn {
                table: COMMANDS_TABLE,
                column: required,
            });
        }
    }

    Ok(())
}

fn parse_command_row(row: &Row<'_>) -> RepoResult<Command> {
    let command = Command {
        id: row.get("Id")?,
        how_to: row.get("HowTo")?,
        line: row.get("Line")?,
        platform: row.get("Platform")?,
    };
    command.validate().map_err(|err| {
        RepoError::InvalidData(format!("row {} in Commands: {err}", command.id))
    })?;
    Ok(command)
}
