//! Core data types for `runreport`.
//!
//! A run payload is either a bare [`RunResult`] or a comparison wrapper
//! `{"compare": {"after": ..., "before": ...}}`. Every field is optional and
//! defaults are applied here, at the deserialization boundary, so renderers
//! never have to guard against missing data.

pub mod lenient;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One benchmark execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunResult {
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub rows: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub bytes: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub throughput_mb_s: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub tokens_per_sec: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub allocs_per_sec: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub p50_ms: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub p95_ms: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub wall_time_ms: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub peak_rss_mb: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub cpu_pct: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub file_size: Option<f64>,
    #[serde(deserialize_with = "lenient::vec", skip_serializing_if = "Vec::is_empty")]
    pub stage_times: Vec<StageTime>,
    #[serde(deserialize_with = "lenient::counts", skip_serializing_if = "IndexMap::is_empty")]
    pub errors_by_field: IndexMap<String, f64>,
    #[serde(deserialize_with = "lenient::vec", skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<SeriesSample>,
    #[serde(deserialize_with = "lenient::vec", skip_serializing_if = "Vec::is_empty")]
    pub csv_vs_jsonl_tokens: Vec<FormatThroughput>,
}

/// Time spent in one pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTime {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub stage: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub duration_ms: Option<f64>,
}

/// One telemetry sample taken during the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesSample {
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub time_ms: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub mb_s: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub rss_mb: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub allocs_per_sec: Option<f64>,
}

/// Tokenizer throughput for one input format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatThroughput {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub format: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub tokens_per_sec: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub mb_s: Option<f64>,
}

impl RunResult {
    /// Build a run from an arbitrary JSON value.
    ///
    /// Non-object values yield an empty run.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!(error = %e, "run payload did not match the expected shape");
            Self::default()
        })
    }

    /// Wall-clock time, or 0 when absent.
    #[must_use]
    pub fn wall_time(&self) -> f64 {
        self.wall_time_ms.unwrap_or(0.0)
    }
}

/// The run being reported, plus an optional baseline to compare against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonContext {
    pub current: RunResult,
    pub baseline: Option<RunResult>,
    /// The raw JSON of `current`, kept for the downloadable copy.
    pub current_raw: Value,
    /// The whole payload as loaded.
    pub payload: Value,
}

impl ComparisonContext {
    /// Resolve a payload into current/baseline runs.
    ///
    /// `current` is `compare.after` when present, otherwise the whole
    /// payload. `baseline` is `compare.before` when present.
    #[must_use]
    pub fn from_value(payload: Value) -> Self {
        let compare = payload.get("compare").filter(|v| !v.is_null());
        let after = compare
            .and_then(|c| c.get("after"))
            .filter(|v| !v.is_null());
        let before = compare
            .and_then(|c| c.get("before"))
            .filter(|v| !v.is_null());

        let current_raw = after.cloned().unwrap_or_else(|| payload.clone());
        let current = RunResult::from_value(&current_raw);
        let baseline = before.map(RunResult::from_value);

        Self {
            current,
            baseline,
            current_raw,
            payload,
        }
    }

    /// An empty context, as produced after total load failure.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_value(Value::Object(serde_json::Map::new()))
    }

    #[must_use]
    pub const fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_run_has_no_baseline() {
        let ctx = ComparisonContext::from_value(json!({"rows": 10, "filename": "a.csv"}));
        assert_eq!(ctx.current.rows, Some(10.0));
        assert_eq!(ctx.current.filename.as_deref(), Some("a.csv"));
        assert!(!ctx.has_baseline());
    }

    #[test]
    fn compare_wrapper_resolves_both_sides() {
        let ctx = ComparisonContext::from_value(json!({
            "compare": {
                "after": {"tokens_per_sec": 120.0},
                "before": {"tokens_per_sec": 100.0}
            }
        }));
        assert_eq!(ctx.current.tokens_per_sec, Some(120.0));
        assert_eq!(
            ctx.baseline.as_ref().and_then(|b| b.tokens_per_sec),
            Some(100.0)
        );
        assert_eq!(ctx.current_raw, json!({"tokens_per_sec": 120.0}));
    }

    #[test]
    fn compare_without_before_has_no_baseline() {
        let ctx = ComparisonContext::from_value(json!({
            "compare": {"after": {"rows": 3}, "before": null}
        }));
        assert_eq!(ctx.current.rows, Some(3.0));
        assert!(ctx.baseline.is_none());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let run = RunResult::from_value(&json!({}));
        assert!(run.stage_times.is_empty());
        assert!(run.series.is_empty());
        assert!(run.errors_by_field.is_empty());
        assert!(run.csv_vs_jsonl_tokens.is_empty());
        assert_eq!(run.wall_time(), 0.0);
    }

    #[test]
    fn mistyped_fields_do_not_discard_the_run() {
        let run = RunResult::from_value(&json!({
            "rows": "1500",
            "series": null,
            "stage_times": [{"stage": "parse", "duration_ms": 5}, 7, "x"],
            "errors_by_field": {"price": "3", "qty": "n/a"},
            "filename": 42,
            "p95_ms": {"nested": true}
        }));
        assert_eq!(run.rows, Some(1500.0));
        assert!(run.series.is_empty());
        assert_eq!(run.stage_times.len(), 1);
        assert_eq!(run.errors_by_field.get("price"), Some(&3.0));
        assert_eq!(run.errors_by_field.get("qty"), Some(&0.0));
        assert_eq!(run.filename.as_deref(), Some("42"));
        assert_eq!(run.p95_ms, None);
    }

    #[test]
    fn error_map_preserves_insertion_order() {
        let run: RunResult =
            serde_json::from_str(r#"{"errors_by_field": {"zeta": 1, "alpha": 2, "mid": 3}}"#)
                .unwrap();
        let keys: Vec<&str> = run.errors_by_field.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn non_object_payload_is_empty_run() {
        let ctx = ComparisonContext::from_value(json!([1, 2, 3]));
        assert_eq!(ctx.current, RunResult::default());
    }
}
