//! Core persistence layer for the Commander command catalogue.
//! Every backend implements one repository contract; callers pick a backend
//! once at startup and never see storage details.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use self::config::{BackendKind, CommanderConfig, ConfigError, DbSettings, Secret, SqliteLocation};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::command::{Command, CommandField, CommandId, CommandValidationError, NewCommand};
pub use repo::command_repo::{CommandRepository, RepoError, RepoResult, SaveSummary};
pub use repo::memory_repo::{InMemoryCommandRepository, InMemoryCommandStore};
pub use repo::mock_repo::MockCommandRepository;
pub use repo::sql_repo::SqlCommandRepository;
pub use service::backend::{CommandBackend, SqlStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
