//! Error types for the progression engine library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all progression operations.
#[derive(Error, Debug)]
pub enum ProgressionError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: u64 },
    /// Stage not found for the given ID
    #[error("Stage with ID {id} not found")]
    StageNotFound { id: u64 },
    /// Attempt to enter a stage whose unlock conditions are not met.
    ///
    /// This is an expected outcome in interactive use; callers typically
    /// render the hint instead of treating it as a failure.
    #[error("Stage {index} of plan {plan_id} is locked: {hint}")]
    StageLocked {
        plan_id: u64,
        index: usize,
        hint: String,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> ProgressionError {
        ProgressionError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> ProgressionError {
        ProgressionError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl ProgressionError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a new database error with additional context.
    pub fn database_error(message: &str, source: rusqlite::Error) -> Self {
        Self::database(message).with_source(source)
    }

    /// Returns true for the recoverable locked-stage outcome.
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::StageLocked { .. })
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

/// Specialized extension trait for configuration-related Results.
pub trait ConfigResultExt<T> {
    /// Map configuration errors with a message.
    fn config_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| ProgressionError::database(message).with_source(e))
    }
}

impl<T> ConfigResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn config_context(self, message: &str) -> Result<T> {
        self.map_err(|e| ProgressionError::Configuration {
            message: format!("{message}: {e}"),
        })
    }
}

/// Result type alias for progression operations
pub type Result<T> = std::result::Result<T, ProgressionError>;
