//! Command output that respects json/quiet modes.
//!
//! Render and theme commands report through [`OutputContext`] so the same
//! command body serves people and scripts. Logs go to stderr through
//! `tracing`; this is stdout only.

use crate::cli::Cli;
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Plain text for people.
    Plain,
    /// JSON output only.
    Json,
    /// Nothing but errors.
    Quiet,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    mode: OutputMode,
}

impl OutputContext {
    #[must_use]
    pub const fn from_args(args: &Cli) -> Self {
        Self::from_flags(args.json, args.quiet)
    }

    #[must_use]
    pub const fn from_flags(json: bool, quiet: bool) -> Self {
        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Plain
        };
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    pub fn print(&self, content: &str) {
        if self.mode == OutputMode::Plain {
            println!("{content}");
        }
    }

    pub fn success(&self, message: &str) {
        if self.mode == OutputMode::Plain {
            println!("✓ {message}");
        }
    }

    pub fn warning(&self, message: &str) {
        if self.mode == OutputMode::Plain {
            eprintln!("Warning: {message}");
        }
    }

    /// Print `value` as pretty JSON in json mode.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json_pretty<T: Serialize>(&self, value: &T) -> Result<()> {
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_wins_over_quiet() {
        assert_eq!(OutputContext::from_flags(true, true).mode(), OutputMode::Json);
        assert_eq!(OutputContext::from_flags(false, true).mode(), OutputMode::Quiet);
        assert_eq!(OutputContext::from_flags(false, false).mode(), OutputMode::Plain);
    }
}
