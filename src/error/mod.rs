//! Error types and handling for `runreport`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration via the `Other` variant
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for scripted callers
//!
//! Most failures inside a render pass are *not* propagated through this type:
//! KPI, table and chart failures are reported to the document as banners and
//! the pass carries on. `ReportError` is what crosses component boundaries
//! and what the CLI turns into an exit code.

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `runreport` operations.
#[derive(Error, Debug)]
pub enum ReportError {
    // === Input Errors ===
    /// Input file does not exist.
    #[error("Input not found at '{path}'")]
    InputNotFound { path: PathBuf },

    /// Payload text could not be parsed as JSON.
    #[error("Could not parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// The fallback resource could not be read.
    #[error("Could not fetch {resource}: {reason}")]
    Fetch { resource: String, reason: String },

    // === Render Errors ===
    /// A mount point required by an operation is missing.
    #[error("Mount element not found: #{target}")]
    MountNotFound { target: String },

    /// The chart renderer rejected a spec.
    #[error("Render failed for #{target}: {reason}")]
    Render { target: String, reason: String },

    /// The chart runtime never became available.
    #[error("Chart runtime unavailable after {attempts} attempts")]
    ChartRuntimeUnavailable { attempts: u32 },

    // === Theme Errors ===
    /// Theme name is not `light` or `dark`.
    #[error("Invalid theme: {value}")]
    InvalidTheme { value: String },

    // === Configuration Errors ===
    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InputNotFound { .. } => Some("Check the input path (use '-' for stdin)"),
            Self::InvalidTheme { .. } => Some("Valid themes: light, dark"),
            Self::ChartRuntimeUnavailable { .. } => {
                Some("Check assets.vega, assets.vega-lite and assets.vega-embed in config")
            }
            Self::Config(_) => Some("Run with -v to see which config layers were loaded"),
            _ => None,
        }
    }

    /// Create a render error for a mount target.
    pub fn render(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Render {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an error with a context message.
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Result type using `ReportError`.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_target() {
        let err = ReportError::render("chart-rss", "bad spec");
        assert_eq!(err.to_string(), "Render failed for #chart-rss: bad spec");
    }

    #[test]
    fn runtime_error_points_at_asset_config() {
        let err = ReportError::ChartRuntimeUnavailable { attempts: 40 };
        assert_eq!(err.to_string(), "Chart runtime unavailable after 40 attempts");
        assert!(err.suggestion().unwrap().contains("assets.vega"));
    }

    #[test]
    fn suggestion_for_theme() {
        let err = ReportError::InvalidTheme {
            value: "sepia".to_string(),
        };
        assert_eq!(err.suggestion(), Some("Valid themes: light, dark"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ReportError = io.into();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
