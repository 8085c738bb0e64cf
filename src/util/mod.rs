//! Shared utilities for `runreport`.
//!
//! - Bounded polling with a pluggable pause
//! - Artifact directory slugs (SHA256 prefix, basename, key path)

pub mod retry;
pub mod slug;

pub use retry::{NoPause, Pause, PollOutcome, RetryPolicy, ThreadPause, poll};
pub use slug::{DEFAULT_SLUG_LENGTH, SlugMode, make_slug};
