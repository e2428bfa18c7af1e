//! Error types module
//!
//! All request-path failures are unified under [`AppError`]. Each variant describes
//! its own HTTP presentation through [`ErrorMetadata`], so the API crate only has to
//! render what the error says about itself.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for failures caused by the uploaded media itself
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "missing_file")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("No file provided")]
    MissingFile,

    #[error("File too large: {size} bytes exceeds max {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid file type: content type '{content_type}', filename '{filename}'")]
    InvalidType {
        content_type: String,
        filename: String,
    },

    #[error("Processing failed: {message}")]
    ProcessingFailed {
        message: String,
        /// Bounded tool output kept for diagnostics
        diagnostic: Option<String>,
    },

    #[error("Missing sessionId")]
    MissingSessionId,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "server_error",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::MissingFile => (
            400,
            "missing_file",
            false,
            Some("Attach the recording in a form field named 'file'"),
            false,
            LogLevel::Debug,
        ),
        AppError::FileTooLarge { .. } => (
            413,
            "file_too_large",
            false,
            Some("Trim or compress the recording and upload again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidType { .. } => (
            400,
            "invalid_type",
            false,
            Some("Upload a video file such as .webm"),
            false,
            LogLevel::Debug,
        ),
        AppError::ProcessingFailed { .. } => (
            500,
            "processing_failed",
            true,
            Some("Upload the recording again"),
            false,
            LogLevel::Warn,
        ),
        AppError::MissingSessionId => (
            400,
            "missing_session_id",
            false,
            Some("Include sessionId in the request body"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingFields(_) => (
            400,
            "missing_fields",
            false,
            Some("Include sessionId, watchedSeconds and videoDuration"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "invalid_input",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "not_found",
            false,
            Some("Verify the video ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "forbidden",
            false,
            None,
            false,
            LogLevel::Warn,
        ),
        AppError::Storage(_) => (
            500,
            "server_error",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "server_error",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "server_error",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::MissingFile => "MissingFile",
            AppError::FileTooLarge { .. } => "FileTooLarge",
            AppError::InvalidType { .. } => "InvalidType",
            AppError::ProcessingFailed { .. } => "ProcessingFailed",
            AppError::MissingSessionId => "MissingSessionId",
            AppError::MissingFields(_) => "MissingFields",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Diagnostic output that is shown to clients regardless of environment.
    ///
    /// Only processing failures carry one: the tail of the external tool's stderr.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            AppError::ProcessingFailed { diagnostic, .. } => diagnostic.as_deref(),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Internal server error".to_string(),
            AppError::MissingFile => "No file provided".to_string(),
            AppError::FileTooLarge { max, .. } => format!(
                "File size exceeds maximum allowed size of {} MB",
                max / 1024 / 1024
            ),
            AppError::InvalidType { .. } => "File must be a video".to_string(),
            AppError::ProcessingFailed { message, .. } => message.clone(),
            AppError::MissingSessionId => "sessionId is required".to_string(),
            AppError::MissingFields(fields) => {
                format!("Missing required fields: {}", fields.join(", "))
            }
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Forbidden(_) => "Forbidden".to_string(),
            AppError::Storage(_) => "Internal server error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
