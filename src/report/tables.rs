//! Table bodies and the downloadable copy of the run.
//!
//! Cells are written as literal markup. Payloads come from our own
//! benchmark runs and are trusted.

use crate::document::Document;
use crate::error::Result;
use crate::format::{int, ms, num, share, text_or_dash};
use crate::model::RunResult;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

pub const DOWNLOAD_LINK_ID: &str = "download-json";

/// Input metadata rows.
#[must_use]
pub fn input_meta_rows(current: &RunResult) -> String {
    let rows = [
        ("Filename", text_or_dash(current.filename.as_deref())),
        ("Content-Type", text_or_dash(current.content_type.as_deref())),
        ("Size (bytes)", int(current.file_size)),
        ("ETag", text_or_dash(current.etag.as_deref())),
    ];
    rows.iter()
        .map(|(k, v)| format!("<tr><td>{k}</td><td>{v}</td></tr>"))
        .collect()
}

/// Share shown on the synthesized `Total` row.
const WHOLE_RUN_SHARE: &str = "100%";

/// Per-stage timing rows with each stage's share of wall time.
#[must_use]
pub fn stage_rows(current: &RunResult) -> String {
    let total = current.wall_time();
    let rows: String = current
        .stage_times
        .iter()
        .map(|s| {
            let duration = s.duration_ms.unwrap_or(0.0);
            let percent = if total > 0.0 {
                duration / total * 100.0
            } else {
                0.0
            };
            format!(
                r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
                text_or_dash(s.stage.as_deref()),
                ms(s.duration_ms),
                share(percent)
            )
        })
        .collect();

    if !rows.is_empty() {
        return rows;
    }
    if total > 0.0 {
        return format!(
            r#"<tr><td>Total</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            ms(Some(total)),
            WHOLE_RUN_SHARE
        );
    }
    r#"<tr><td colspan="3" class="muted">No stage timings.</td></tr>"#.to_string()
}

/// Error count rows.
#[must_use]
pub fn error_rows(current: &RunResult) -> String {
    if current.errors_by_field.is_empty() {
        return r#"<tr><td colspan="2" class="muted">No errors recorded.</td></tr>"#.to_string();
    }
    current
        .errors_by_field
        .iter()
        .map(|(field, count)| format!(r#"<tr><td>{field}</td><td class="num">{}</td></tr>"#, int(Some(*count))))
        .collect()
}

/// Label for the run's own format, from its content type.
#[must_use]
pub fn observed_format(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some("application/x-ndjson") => "JSONL",
        Some("text/csv") => "CSV",
        _ => "Observed",
    }
}

/// Format comparison rows. Without explicit rows the run itself is shown,
/// labelled by its content type.
#[must_use]
pub fn format_rows(current: &RunResult) -> String {
    let row = |label: &str, tokens: Option<f64>, mbs: Option<f64>| {
        format!(
            r#"<tr><td>{label}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            num(tokens),
            num(mbs)
        )
    };
    if current.csv_vs_jsonl_tokens.is_empty() {
        return row(
            observed_format(current.content_type.as_deref()),
            current.tokens_per_sec,
            current.throughput_mb_s,
        );
    }
    current
        .csv_vs_jsonl_tokens
        .iter()
        .map(|r| row(&text_or_dash(r.format.as_deref()), r.tokens_per_sec, r.mb_s))
        .collect()
}

/// `data:` URI holding a pretty-printed copy of `raw`.
///
/// # Errors
///
/// Returns an error if `raw` cannot be serialized.
pub fn download_uri(raw: &Value) -> Result<String> {
    let pretty = serde_json::to_string_pretty(raw)?;
    Ok(format!(
        "data:application/json;base64,{}",
        STANDARD.encode(pretty.as_bytes())
    ))
}

/// Fill every table body and point the download link at the current run.
///
/// # Errors
///
/// Returns an error if the downloadable copy cannot be produced. Table
/// bodies are written before that step.
pub fn render_tables(doc: &mut dyn Document, current: &RunResult, raw: &Value) -> Result<()> {
    doc.set_descendant_html("tbl-input-meta", "tbody", &input_meta_rows(current));
    doc.set_descendant_html("tbl-stage", "tbody", &stage_rows(current));
    doc.set_descendant_html("tbl-errors", "tbody", &error_rows(current));
    doc.set_descendant_html("tbl-format", "tbody", &format_rows(current));

    if doc.contains(DOWNLOAD_LINK_ID) {
        doc.set_attr(DOWNLOAD_LINK_ID, "href", &download_uri(raw)?);
    }
    Ok(())
}
