//! Fixed-data command repository for read-path smoke testing.
//!
//! Reads return hardcoded samples; every write fails with `Unsupported`.
//! `get_command_by_id` ignores its argument.

use crate::model::command::{Command, CommandId, NewCommand};
use crate::repo::command_repo::{CommandRepository, RepoError, RepoResult, SaveSummary};

/// Stateless stand-in repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCommandRepository;

impl MockCommandRepository {
    pub fn new() -> Self {
        Self
    }
}

fn sample(id: CommandId, how_to: &str, line: &str, platform: &str) -> Command {
    Command {
        id,
        how_to: how_to.to_string(),
        line: line.to_string(),
        platform: platform.to_string(),
    }
}

impl CommandRepository for MockCommandRepository {
    fn create_command(&mut self, _command: NewCommand) -> RepoResult<()> {
        Err(RepoError::Unsupported("create_command"))
    }

    fn delete_command(&mut self, _command: &Command) -> RepoResult<()> {
        Err(RepoError::Unsupported("delete_command"))
    }

    fn update_command(&mut self, _command: &Command) -> RepoResult<()> {
        Err(RepoError::Unsupported("update_command"))
    }

    fn get_command_by_id(&self, _id: CommandId) -> RepoResult<Command> {
        Ok(sample(0, "Drive a car", "Pass the driving test", "Ground"))
    }

    fn get_all_commands(&self) -> RepoResult<Vec<Command>> {
        Ok(vec![
            sample(0, "Drive a car", "Pass the driving test", "Car"),
            sample(1, "Ride a horse", "Make the horse calm", "Horse"),
            sample(2, "Play football", "Discipline & hard work", "Ground"),
        ])
    }

    fn save_changes(&mut self) -> RepoResult<SaveSummary> {
        Err(RepoError::Unsupported("save_changes"))
    }
}
