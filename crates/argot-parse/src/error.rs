use serde_json::Value;
use thiserror::Error;

/// Stable discriminant for [`ParseError`].
///
/// The string form (`as_str`) is what callers print or match on when they
/// cannot depend on the Rust enum (e.g. JSON output of the `argot` binary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidDefinitions,
    InvalidCommand,
    NoCommands,
    AlreadySet,
    UnknownOption,
    UnknownValue,
    InvalidValue,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDefinitions => "INVALID_DEFINITIONS",
            Self::InvalidCommand => "INVALID_COMMAND",
            Self::NoCommands => "NO_COMMANDS",
            Self::AlreadySet => "ALREADY_SET",
            Self::UnknownOption => "UNKNOWN_OPTION",
            Self::UnknownValue => "UNKNOWN_VALUE",
            Self::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The definition set is malformed. Raised before any token is scanned.
    #[error("invalid option definitions: {message}")]
    InvalidDefinition { message: String },

    #[error("command not recognised: {}", .command.as_deref().unwrap_or("<none>"))]
    CommandNotRecognised { command: Option<String> },

    #[error("please supply one or more commands")]
    NoCommandsDefined,

    /// A second explicit value for a singular option.
    ///
    /// `previous` is the value held before the rejected assignment, `value`
    /// the raw token that was rejected (`None` for a valueless occurrence).
    #[error("singular option already set [{option}={previous}]")]
    AlreadySet {
        option: String,
        previous: Value,
        value: Option<String>,
    },

    #[error("unknown option: {option}")]
    UnknownOption { option: String },

    #[error("unknown value: {value}")]
    UnknownValue { value: String },

    #[error("invalid value for --{option}: {value:?} ({reason})")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDefinition { .. } => ErrorKind::InvalidDefinitions,
            Self::CommandNotRecognised { .. } => ErrorKind::InvalidCommand,
            Self::NoCommandsDefined => ErrorKind::NoCommands,
            Self::AlreadySet { .. } => ErrorKind::AlreadySet,
            Self::UnknownOption { .. } => ErrorKind::UnknownOption,
            Self::UnknownValue { .. } => ErrorKind::UnknownValue,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
        }
    }

    pub(crate) fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }
}

/// Result alias for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;
