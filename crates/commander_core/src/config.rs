//! Process configuration for backend selection and database settings.
//!
//! # Responsibility
//! - Resolve backend choice, database settings and logging settings from
//!   environment-style keys.
//! - Keep credentials out of `Debug`/`Display` output.
//!
//! # Invariants
//! - Configuration is read once at startup and is immutable afterwards.
//! - Absent database keys fall back to development defaults; those defaults
//!   are never acceptable for production deployments.
//! - A `CommanderConnection` string overrides the discrete `DB*` keys.

use crate::logging::default_log_level;
use ::config::{Config, Environment};
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const BACKEND_KEY: &str = "COMMANDER_BACKEND";
pub const CONNECTION_STRING_KEY: &str = "CommanderConnection";
pub const DB_SERVER_KEY: &str = "DBServer";
pub const DB_PORT_KEY: &str = "DBPort";
pub const DATABASE_KEY: &str = "Database";
pub const DB_USER_KEY: &str = "DBUser";
pub const DB_PASSWORD_KEY: &str = "DBPassword";
pub const LOG_LEVEL_KEY: &str = "COMMANDER_LOG_LEVEL";
pub const LOG_DIR_KEY: &str = "COMMANDER_LOG_DIR";

pub const DEFAULT_DB_SERVER: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 1433;
pub const DEFAULT_DATABASE: &str = "CommanderDB";
pub const DEFAULT_DB_USER: &str = "sa";
pub const DEFAULT_DB_PASSWORD: &str = "Pa$$w0rd";

/// Database name that selects a private in-memory SQLite store.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownBackend(String),
    InvalidPort(String),
    MalformedConnectionString(String),
    /// The environment source could not be collected.
    Source(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unsupported backend `{value}`; expected sql|mock|memory"
            ),
            Self::InvalidPort(value) => write!(f, "invalid database port `{value}`"),
            Self::MalformedConnectionString(segment) => {
                write!(f, "malformed connection string segment `{segment}`")
            }
            Self::Source(message) => write!(f, "failed to read configuration: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Wrapper that redacts its value in `Debug` and `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Returns the wrapped value. Callers must not log it.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

impl<T> Display for Secret<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

/// Which repository implementation serves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Sql,
    Mock,
    Memory,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Mock => "mock",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sql" | "sqlite" => Ok(Self::Sql),
            "mock" => Ok(Self::Mock),
            "memory" | "in-memory" | "in_memory" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Where the SQLite store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    Memory,
    File(PathBuf),
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Secret<String>,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            server: DEFAULT_DB_SERVER.to_string(),
            port: DEFAULT_DB_PORT,
            database: DEFAULT_DATABASE.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: Secret::new(DEFAULT_DB_PASSWORD.to_string()),
        }
    }
}

impl DbSettings {
    /// Parses a `key=value;key=value` connection string.
    ///
    /// Keys are case-insensitive. Recognized keys override the defaults;
    /// unrecognized keys are ignored. `Server=host,port` carries the port
    /// inline. `Data Source` names the database file.
    ///
    /// # Errors
    /// - `MalformedConnectionString` for a non-empty segment without `=`.
    /// - `InvalidPort` for a port that is not a `u16`.
    pub fn from_connection_string(value: &str) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        for segment in value.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, raw) = segment
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedConnectionString(segment.to_string()))?;
            let raw = raw.trim();

            match key.trim().to_ascii_lowercase().as_str() {
                "server" | "address" | "addr" => match raw.split_once(',') {
                    Some((host, port)) => {
                        settings.server = host.trim().to_string();
                        settings.port = parse_port(port)?;
                    }
                    None => settings.server = raw.to_string(),
                },
                "port" => settings.port = parse_port(raw)?,
                "database" | "initial catalog" | "data source" => {
                    settings.database = raw.to_string()
                }
                "user id" | "uid" | "user" => settings.user = raw.to_string(),
                "password" | "pwd" => settings.password = Secret::new(raw.to_string()),
                _ => {}
            }
        }

        Ok(settings)
    }

    /// Whether the development default password is in effect.
    pub fn uses_default_password(&self) -> bool {
        self.password.expose() == DEFAULT_DB_PASSWORD
    }

    /// Resolves the SQLite store location from the database name.
    ///
    /// `:memory:` selects an in-memory store; a name without an extension
    /// gets `.db` appended.
    pub fn sqlite_location(&self) -> SqliteLocation {
        let name = self.database.trim();
        if name == IN_MEMORY_DATABASE {
            return SqliteLocation::Memory;
        }

        let mut path = PathBuf::from(name);
        if path.extension().is_none() {
            path.set_extension("db");
        }
        SqliteLocation::File(path)
    }
}

impl Display for DbSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Server={},{};Initial Catalog={};User ID={};Password={}",
            self.server, self.port, self.database, self.user, self.password
        )
    }
}

/// Complete startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommanderConfig {
    pub backend: BackendKind,
    pub db: DbSettings,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            db: DbSettings::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CommanderConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    /// Reads configuration from a `config` environment source.
    ///
    /// The source lowercases variable names, so keys are matched without
    /// regard to case.
    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let source = Config::builder()
            .add_source(environment)
            .build()
            .map_err(|err| ConfigError::Source(err.to_string()))?;
        Self::from_lookup(|key| source.get_string(&key.to_ascii_lowercase()).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match get(BACKEND_KEY) {
            Some(value) => value.parse()?,
            None => BackendKind::default(),
        };

        let db = match get(CONNECTION_STRING_KEY) {
            Some(connection) => DbSettings::from_connection_string(&connection)?,
            None => {
                let defaults = DbSettings::default();
                DbSettings {
                    server: get(DB_SERVER_KEY).unwrap_or(defaults.server),
                    port: match get(DB_PORT_KEY) {
                        Some(port) => parse_port(&port)?,
                        None => defaults.port,
                    },
                    database: get(DATABASE_KEY).unwrap_or(defaults.database),
                    user: get(DB_USER_KEY).unwrap_or(defaults.user),
                    password: get(DB_PASSWORD_KEY)
                        .map(Secret::new)
                        .unwrap_or(defaults.password),
                }
            }
        };

        Ok(Self {
            backend,
            db,
            log_level: get(LOG_LEVEL_KEY).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: get(LOG_DIR_KEY),
        })
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(value.trim().to_string()))
}
