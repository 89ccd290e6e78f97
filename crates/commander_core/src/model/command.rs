//! Command domain model.
//!
//! # Responsibility
//! - Define the single persisted record (`Command`) and its creation shape.
//! - Validate required-field presence before any write reaches storage.
//!
//! # Invariants
//! - `id` is assigned by the persistence layer and never changes afterwards.
//! - `how_to`, `line` and `platform` are never blank.
//! - New records carry no id; see `NewCommand`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier of a command.
pub type CommandId = i64;

/// Required text fields of a command, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandField {
    HowTo,
    Line,
    Platform,
}

impl CommandField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HowTo => "howTo",
            Self::Line => "line",
            Self::Platform => "platform",
        }
    }
}

/// Model-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandValidationError {
    /// A required text field is empty or whitespace only.
    MissingField(CommandField),
}

impl Display for CommandValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{} is required", field.as_str()),
        }
    }
}

impl Error for CommandValidationError {}

/// A persisted command record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CommandWire")]
pub struct Command {
    pub id: CommandId,
    /// Short label describing the action.
    pub how_to: String,
    /// The command line or instructional phrase for the action.
    pub line: String,
    /// Context the command applies to.
    pub platform: String,
}

/// Unvalidated deserialization shape for `Command`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandWire {
    id: CommandId,
    how_to: String,
    line: String,
    platform: String,
}

impl TryFrom<CommandWire> for Command {
    type Error = CommandValidationError;

    fn try_from(value: CommandWire) -> Result<Self, Self::Error> {
        let command = Self {
            id: value.id,
            how_to: value.how_to,
            line: value.line,
            platform: value.platform,
        };
        command.validate()?;
        Ok(command)
    }
}

impl Command {
    /// Builds a record from an already-assigned id and creation fields.
    pub fn from_new(id: CommandId, new: NewCommand) -> Self {
        Self {
            id,
            how_to: new.how_to,
            line: new.line,
            platform: new.platform,
        }
    }

    /// Checks required-field presence.
    pub fn validate(&self) -> Result<(), CommandValidationError> {
        validate_fields(&self.how_to, &self.line, &self.platform)
    }
}

/// Creation payload for a command; the id is assigned on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommand {
    pub how_to: String,
    pub line: String,
    pub platform: String,
}

impl NewCommand {
    pub fn new(
        how_to: impl Into<String>,
        line: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            how_to: how_to.into(),
            line: line.into(),
            platform: platform.into(),
        }
    }

    /// Checks required-field presence.
    pub fn validate(&self) -> Result<(), CommandValidationError> {
        validate_fields(&self.how_to, &self.line, &self.platform)
    }
}

fn validate_fields(
    how_to: &str,
    line: &str,
    platform: &str,
) -> Result<(), CommandValidationError> {
    let fields = [
        (CommandField::HowTo, how_to),
        (CommandField::Line, line),
        (CommandField::Platform, platform),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(CommandValidationError::MissingField(field));
        }
    }
    Ok(())
}
