//! Headline metrics and the before/after comparison strip.

use crate::document::Document;
use crate::format::{chip, delta, int, mb, ms, num, pct, text_or_dash};
use crate::model::RunResult;

pub const COMPARE_HOST_ID: &str = "compare-kpis";

/// One before/after comparison.
struct CompareItem {
    label: &'static str,
    after: Option<f64>,
    before: Option<f64>,
    unit: &'static str,
    /// Lower is better.
    invert: bool,
}

fn kpi_values(current: &RunResult) -> [(&'static str, String); 11] {
    [
        ("kpi-rows", int(current.rows)),
        ("kpi-mbs", num(current.throughput_mb_s)),
        ("kpi-tokens", num(current.tokens_per_sec)),
        ("kpi-allocs", num(current.allocs_per_sec)),
        ("kpi-p95", ms(current.p95_ms)),
        ("kpi-rss", mb(current.peak_rss_mb)),
        ("kpi-cpu", pct(current.cpu_pct)),
        ("kpi-file", text_or_dash(current.filename.as_deref())),
        ("kpi-type", text_or_dash(current.content_type.as_deref())),
        ("kpi-size", int(current.file_size)),
        ("kpi-etag", text_or_dash(current.etag.as_deref())),
    ]
}

fn compare_items(current: &RunResult, baseline: &RunResult) -> [CompareItem; 6] {
    [
        CompareItem {
            label: "Tokens/sec",
            after: current.tokens_per_sec,
            before: baseline.tokens_per_sec,
            unit: "",
            invert: false,
        },
        CompareItem {
            label: "MB/s",
            after: current.throughput_mb_s,
            before: baseline.throughput_mb_s,
            unit: "",
            invert: false,
        },
        CompareItem {
            label: "p95 (ms)",
            after: current.p95_ms,
            before: baseline.p95_ms,
            unit: " ms",
            invert: true,
        },
        CompareItem {
            label: "Peak RSS (MB)",
            after: current.peak_rss_mb,
            before: baseline.peak_rss_mb,
            unit: " MB",
            invert: true,
        },
        CompareItem {
            label: "CPU %",
            after: current.cpu_pct,
            before: baseline.cpu_pct,
            unit: "%",
            invert: true,
        },
        CompareItem {
            label: "Allocs/sec",
            after: current.allocs_per_sec,
            before: baseline.allocs_per_sec,
            unit: "",
            invert: true,
        },
    ]
}

/// Markup for the comparison strip.
#[must_use]
pub fn compare_markup(current: &RunResult, baseline: &RunResult) -> String {
    compare_items(current, baseline)
        .iter()
        .map(|item| {
            let d = delta(item.after, item.before, item.invert);
            format!(
                concat!(
                    r#"<div class="kpi-compare">"#,
                    r#"<div class="kpi-compare__label">{label}</div>"#,
                    r#"<div class="kpi-compare__vals">"#,
                    r#"<span class="kpi-compare__after">{after}</span>"#,
                    r#"<span class="kpi-compare__sep"> vs </span>"#,
                    r#"<span class="kpi-compare__before">{before}</span>"#,
                    "{chip}</div></div>"
                ),
                label = item.label,
                after = num(item.after),
                before = num(item.before),
                chip = chip(&d, item.unit),
            )
        })
        .collect()
}

/// Write KPI values, and the comparison strip when a baseline exists.
/// Returns the number of mount points written.
pub fn mount_kpis(doc: &mut dyn Document, current: &RunResult, baseline: Option<&RunResult>) -> usize {
    let mut written = kpi_values(current)
        .iter()
        .filter(|(id, value)| doc.set_text(id, value))
        .count();

    if let Some(baseline) = baseline {
        if doc.set_html(COMPARE_HOST_ID, &compare_markup(current, baseline)) {
            written += 1;
        }
    }
    written
}
