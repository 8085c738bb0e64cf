//! Context loading: embedded data first, sibling `run.json` second.
//!
//! Loading never fails. Each step that goes wrong is logged and the next
//! source is tried; if nothing parses, the caller receives an empty context
//! together with the message that should be surfaced to the reader.

mod sources;

pub use sources::{EmbeddedElement, FileFetcher, InlineText, NoFetch, extract_element_text};

use crate::error::{ReportError, Result};
use crate::model::ComparisonContext;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Name of the fallback resource.
pub const FALLBACK_RESOURCE: &str = "run.json";

/// Id of the element holding the inline payload.
pub const RUN_DATA_ID: &str = "run-data";

/// Message surfaced when neither source could be parsed.
pub const LOAD_FAILURE_MESSAGE: &str = "Could not parse inline JSON or fetch run.json";

static NAN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bNaN\b").expect("static regex"));
static INFINITY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\bInfinity\b").expect("static regex"));

/// Something that can hold the payload text inline (the embedded data holder).
pub trait InlineSource {
    /// The inline text, or `None` when the holder is absent.
    fn inline_text(&self) -> Option<String>;

    /// A short description for logs.
    fn describe(&self) -> String;
}

/// Something that can fetch the fallback resource.
pub trait ResourceFetcher {
    /// Fetch `name` bypassing any cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read.
    fn fetch(&self, name: &str) -> Result<String>;
}

/// Rewrite non-finite numeric tokens to `0`.
///
/// `NaN` is matched case-insensitively, `Infinity` and `-Infinity` exactly;
/// all must stand as whole words, so identifiers such as `NaNoSeconds` or
/// `InfinityPool` are left alone. The rewrite is lossy: a string value that
/// is exactly such a word is rewritten too.
#[must_use]
pub fn sanitize_json_text(text: &str) -> String {
    let without_nan = NAN_TOKEN.replace_all(text, "0");
    INFINITY_TOKEN.replace_all(&without_nan, "0").into_owned()
}

/// Sanitize and parse payload text. Blank text parses as `{}`.
///
/// # Errors
///
/// Returns `ReportError::Parse` if the sanitized text is not valid JSON.
pub fn parse_payload(text: &str, source_name: &str) -> Result<Value> {
    let sanitized = sanitize_json_text(text);
    if sanitized.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(&sanitized).map_err(|e| ReportError::Parse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}

/// Result of a load attempt.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub context: ComparisonContext,
    /// Which source produced the context.
    pub origin: LoadOrigin,
    /// Message to surface when everything failed.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrigin {
    Inline,
    Fallback,
    Empty,
}

/// Loads the comparison context from an inline source with a fallback.
pub struct ContextLoader<'a> {
    inline: &'a dyn InlineSource,
    fetcher: &'a dyn ResourceFetcher,
}

impl<'a> ContextLoader<'a> {
    #[must_use]
    pub fn new(inline: &'a dyn InlineSource, fetcher: &'a dyn ResourceFetcher) -> Self {
        Self { inline, fetcher }
    }

    /// Load the context. Never fails.
    #[must_use]
    pub fn load(&self) -> LoadOutcome {
        let inline_text = self.inline.inline_text().unwrap_or_else(|| "{}".to_string());
        match parse_payload(&inline_text, &self.inline.describe()) {
            Ok(value) => {
                info!(source = %self.inline.describe(), "Loaded inline run data");
                return LoadOutcome {
                    context: ComparisonContext::from_value(value),
                    origin: LoadOrigin::Inline,
                    error: None,
                };
            }
            Err(e) => {
                warn!(error = %e, "inline JSON parse failed, trying {FALLBACK_RESOURCE}");
            }
        }

        match self.fetch_fallback() {
            Ok(value) => {
                info!("Loaded run data from {FALLBACK_RESOURCE}");
                LoadOutcome {
                    context: ComparisonContext::from_value(value),
                    origin: LoadOrigin::Fallback,
                    error: None,
                }
            }
            Err(e) => {
                debug!(error = %e, "fallback load failed");
                LoadOutcome {
                    context: ComparisonContext::empty(),
                    origin: LoadOrigin::Empty,
                    error: Some(LOAD_FAILURE_MESSAGE.to_string()),
                }
            }
        }
    }

    fn fetch_fallback(&self) -> Result<Value> {
        let text = self.fetcher.fetch(FALLBACK_RESOURCE)?;
        parse_payload(&text, FALLBACK_RESOURCE)
    }
}
