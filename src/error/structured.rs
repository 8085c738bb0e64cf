//! Structured error output for scripted callers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Valid theme names, used in hints and context.
const VALID_THEMES: &[&str] = &["light", "dark"];

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // === Input Errors (exit code 2) ===
    /// Input file not found
    InputNotFound,
    /// Payload could not be parsed
    ParseError,
    /// Fallback resource could not be read
    FetchError,

    // === Render Errors (exit code 3) ===
    /// Mount point missing from the document
    MountNotFound,
    /// Chart renderer failure
    RenderError,
    /// Chart runtime never became available
    ChartRuntimeUnavailable,

    // === Theme Errors (exit code 4) ===
    /// Theme name not recognised
    InvalidTheme,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,
    /// Config parse error
    ConfigParseError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InputNotFound => "INPUT_NOT_FOUND",
            Self::ParseError => "PARSE_ERROR",
            Self::FetchError => "FETCH_ERROR",
            Self::MountNotFound => "MOUNT_NOT_FOUND",
            Self::RenderError => "RENDER_ERROR",
            Self::ChartRuntimeUnavailable => "CHART_RUNTIME_UNAVAILABLE",
            Self::InvalidTheme => "INVALID_THEME",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ConfigParseError => "CONFIG_PARSE_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Retryable means the caller might succeed after fixing the input
    /// or waiting for the environment (e.g. asset files being downloaded).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound
                | Self::ParseError
                | Self::FetchError
                | Self::ChartRuntimeUnavailable
                | Self::InvalidTheme
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Input errors
    /// - 3: Render errors
    /// - 4: Theme errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InputNotFound | Self::ParseError | Self::FetchError => 2,
            Self::MountNotFound | Self::RenderError | Self::ChartRuntimeUnavailable => 3,
            Self::InvalidTheme => 4,
            Self::ConfigError | Self::ConfigParseError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `ReportError`.
    #[must_use]
    pub fn from_error(err: &ReportError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = err.suggestion().map(str::to_string);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Format as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &ReportError) -> (ErrorCode, Option<Value>) {
        match err {
            ReportError::InputNotFound { path } => (
                ErrorCode::InputNotFound,
                Some(json!({"path": path.display().to_string()})),
            ),
            ReportError::Parse {
                source_name,
                reason,
            } => (
                ErrorCode::ParseError,
                Some(json!({"source": source_name, "reason": reason})),
            ),
            ReportError::Fetch { resource, reason } => (
                ErrorCode::FetchError,
                Some(json!({"resource": resource, "reason": reason})),
            ),
            ReportError::MountNotFound { target } => {
                (ErrorCode::MountNotFound, Some(json!({"target": target})))
            }
            ReportError::Render { target, reason } => (
                ErrorCode::RenderError,
                Some(json!({"target": target, "reason": reason})),
            ),
            ReportError::ChartRuntimeUnavailable { attempts } => (
                ErrorCode::ChartRuntimeUnavailable,
                Some(json!({"attempts": attempts})),
            ),
            ReportError::InvalidTheme { value } => (
                ErrorCode::InvalidTheme,
                Some(json!({"provided": value, "valid_values": VALID_THEMES})),
            ),
            ReportError::Config(_) => (ErrorCode::ConfigError, None),
            ReportError::Yaml(_) => (ErrorCode::ConfigParseError, None),
            ReportError::Io(_) => (ErrorCode::IoError, None),
            ReportError::Json(_) => (ErrorCode::JsonError, None),
            ReportError::WithContext { .. } | ReportError::Other(_) => {
                (ErrorCode::InternalError, None)
            }
        }
    }
}
