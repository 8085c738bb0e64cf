//! Vega-Lite chart specs for every report chart.
//!
//! Builders are pure: they read a [`ComparisonContext`] and return a spec
//! whose `data.values` may be empty. Deciding what an empty chart means is
//! left to the mounter, which removes the card instead of drawing it.

pub mod mount;
pub mod runtime;

pub use mount::{
    CARD_CLASS, ChartMounter, ChartRenderer, ChartView, EmbedOptions, MountConfig, MountOutcome,
    StaticEmbed, VEGA_SPEC_CLASS,
};
pub use runtime::{
    AssetSource, ChartRuntime, VEGA_CDN, VEGA_EMBED_CDN, VEGA_LITE_CDN, VegaAssets,
    wait_for_runtime,
};

use crate::model::{ComparisonContext, RunResult, SeriesSample};
use serde::Serialize;
use serde_json::{Value, json};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

const BEFORE: &str = "Before";
const AFTER: &str = "After";

/// One chart position on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Throughput,
    Rss,
    Allocs,
    Stages,
    Errors,
    Format,
    CompareTokens,
    CompareMbs,
    CompareLatency,
    CompareRss,
}

impl ChartSlot {
    /// Render order.
    pub const ALL: [Self; 10] = [
        Self::Throughput,
        Self::Rss,
        Self::Allocs,
        Self::Stages,
        Self::Errors,
        Self::Format,
        Self::CompareTokens,
        Self::CompareMbs,
        Self::CompareLatency,
        Self::CompareRss,
    ];

    #[must_use]
    pub const fn mount_id(self) -> &'static str {
        match self {
            Self::Throughput => "chart-throughput",
            Self::Rss => "chart-rss",
            Self::Allocs => "chart-allocs",
            Self::Stages => "chart-stages",
            Self::Errors => "chart-errors",
            Self::Format => "chart-format",
            Self::CompareTokens => "chart-compare-tokens",
            Self::CompareMbs => "chart-compare-mbs",
            Self::CompareLatency => "chart-compare-lat",
            Self::CompareRss => "chart-compare-rss",
        }
    }

    /// Card heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Throughput => "Throughput over time",
            Self::Rss => "Memory (RSS) over time",
            Self::Allocs => "Allocations over time",
            Self::Stages => "Per-stage latency",
            Self::Errors => "Errors by field",
            Self::Format => "CSV vs JSONL tokens/sec",
            Self::CompareTokens => "Tokens/sec",
            Self::CompareMbs => "MB/s",
            Self::CompareLatency => "p95 latency",
            Self::CompareRss => "Peak RSS",
        }
    }

    #[must_use]
    pub const fn height(self) -> u32 {
        match self {
            Self::Throughput | Self::Rss | Self::Allocs | Self::Errors => 220,
            Self::Stages => 260,
            Self::Format => 200,
            Self::CompareTokens | Self::CompareMbs | Self::CompareLatency | Self::CompareRss => 180,
        }
    }

    /// Cards spanning the full grid row.
    #[must_use]
    pub const fn is_wide(self) -> bool {
        matches!(self, Self::Throughput | Self::Stages)
    }

    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::CompareTokens | Self::CompareMbs | Self::CompareLatency | Self::CompareRss
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub values: Vec<Value>,
}

/// A Vega-Lite v5 chart specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub height: u32,
    pub data: ChartData,
    pub mark: Value,
    pub encoding: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosize: Option<Value>,
}

impl ChartSpec {
    #[must_use]
    pub fn new(height: u32, values: Vec<Value>, mark: Value, encoding: Value) -> Self {
        Self {
            schema: VEGA_LITE_SCHEMA.to_string(),
            width: None,
            height,
            data: ChartData { values },
            mark,
            encoding,
            config: None,
            autosize: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.values.is_empty()
    }

    /// Final spec for a measured width: width clamped to `min_width`, theme
    /// merged under the spec's own config, `fit` autosizing unless set.
    #[must_use]
    pub fn with_autosize(&self, width: f64, min_width: f64, theme: &Value) -> Self {
        let mut spec = self.clone();
        spec.width = Some(width.floor().max(min_width).max(0.0) as u32);

        let mut config = match theme {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        if let Some(Value::Object(own)) = &self.config {
            for (key, value) in own {
                config.insert(key.clone(), value.clone());
            }
        }
        spec.config = Some(Value::Object(config));

        if spec.autosize.is_none() {
            spec.autosize = Some(json!({"type": "fit", "contains": "padding"}));
        }
        spec
    }
}

/// Build the spec for one slot.
#[must_use]
pub fn build_spec(slot: ChartSlot, ctx: &ComparisonContext) -> ChartSpec {
    let current = &ctx.current;
    let baseline = ctx.baseline.as_ref();
    match slot {
        ChartSlot::Throughput => time_series(
            slot,
            current,
            baseline,
            "MB/s",
            |s| s.mb_s,
            |r| r.throughput_mb_s,
        ),
        ChartSlot::Rss => time_series(
            slot,
            current,
            baseline,
            "RSS (MB)",
            |s| s.rss_mb,
            |r| r.peak_rss_mb,
        ),
        ChartSlot::Allocs => time_series(
            slot,
            current,
            baseline,
            "Allocs/sec",
            |s| s.allocs_per_sec,
            |r| r.allocs_per_sec,
        ),
        ChartSlot::Stages => stage_bars(current, baseline),
        ChartSlot::Errors => error_bars(current),
        ChartSlot::Format => format_bars(current),
        ChartSlot::CompareTokens => compare_bar(
            slot,
            "Tokens/sec",
            current.tokens_per_sec,
            baseline.and_then(|b| b.tokens_per_sec),
        ),
        ChartSlot::CompareMbs => compare_bar(
            slot,
            "MB/s",
            current.throughput_mb_s,
            baseline.and_then(|b| b.throughput_mb_s),
        ),
        ChartSlot::CompareLatency => compare_bar(
            slot,
            "p95 (ms)",
            current.p95_ms,
            baseline.and_then(|b| b.p95_ms),
        ),
        ChartSlot::CompareRss => compare_bar(
            slot,
            "Peak RSS (MB)",
            current.peak_rss_mb,
            baseline.and_then(|b| b.peak_rss_mb),
        ),
    }
}

/// Every chart the context calls for, in render order. Comparison charts
/// are only built when a baseline exists.
#[must_use]
pub fn build_chart_set(ctx: &ComparisonContext) -> Vec<(ChartSlot, ChartSpec)> {
    ChartSlot::ALL
        .into_iter()
        .filter(|slot| ctx.has_baseline() || !slot.is_comparison())
        .map(|slot| (slot, build_spec(slot, ctx)))
        .collect()
}

fn or_zero(n: Option<f64>) -> f64 {
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Two-point flat line standing in for a missing series.
fn fallback_line(name: &str, value: Option<f64>, total_ms: Option<f64>) -> Vec<Value> {
    let t = or_zero(total_ms).max(1.0);
    let v = or_zero(value);
    vec![
        json!({"name": name, "time_ms": 0, "value": v}),
        json!({"name": name, "time_ms": t, "value": v}),
    ]
}

fn side_series(
    name: &str,
    run: &RunResult,
    sample: fn(&SeriesSample) -> Option<f64>,
    scalar: fn(&RunResult) -> Option<f64>,
) -> Vec<Value> {
    if run.series.is_empty() {
        return fallback_line(name, scalar(run), run.wall_time_ms);
    }
    run.series
        .iter()
        .map(|s| json!({"name": name, "time_ms": s.time_ms, "value": sample(s)}))
        .collect()
}

fn time_series(
    slot: ChartSlot,
    current: &RunResult,
    baseline: Option<&RunResult>,
    y_title: &str,
    sample: fn(&SeriesSample) -> Option<f64>,
    scalar: fn(&RunResult) -> Option<f64>,
) -> ChartSpec {
    let mut values = baseline.map_or_else(Vec::new, |b| side_series(BEFORE, b, sample, scalar));
    values.extend(side_series(AFTER, current, sample, scalar));

    ChartSpec::new(
        slot.height(),
        values,
        json!({"type": "line", "interpolate": "monotone", "point": {"filled": true}}),
        json!({
            "x": {"field": "time_ms", "type": "quantitative", "title": "Time (ms)", "scale": {"nice": true}},
            "y": {"field": "value", "type": "quantitative", "title": y_title, "scale": {"zero": false, "nice": true}},
            "color": {"field": "name", "type": "nominal", "title": "name"}
        }),
    )
}

fn stage_rows(name: &str, run: &RunResult) -> Vec<Value> {
    run.stage_times
        .iter()
        .map(|s| json!({"name": name, "stage": s.stage, "duration_ms": s.duration_ms}))
        .collect()
}

fn stage_bars(current: &RunResult, baseline: Option<&RunResult>) -> ChartSpec {
    let before = baseline.map_or_else(Vec::new, |b| stage_rows(BEFORE, b));
    let after = stage_rows(AFTER, current);

    let values = if before.is_empty() && after.is_empty() {
        // After leads here, unlike the per-stage rows.
        let mut totals =
            vec![json!({"name": AFTER, "stage": "Total", "duration_ms": or_zero(current.wall_time_ms)})];
        if let Some(b) = baseline {
            totals.push(json!({"name": BEFORE, "stage": "Total", "duration_ms": or_zero(b.wall_time_ms)}));
        }
        totals
    } else {
        before.into_iter().chain(after).collect()
    };

    ChartSpec::new(
        ChartSlot::Stages.height(),
        values,
        json!("bar"),
        json!({
            "y": {"field": "stage", "type": "nominal", "sort": "-x", "title": "Stage"},
            "x": {"field": "duration_ms", "type": "quantitative", "title": "Duration (ms)", "scale": {"nice": true}},
            "color": {"field": "name", "type": "nominal", "title": "name"},
            "tooltip": [{"field": "duration_ms", "type": "quantitative"}]
        }),
    )
}

fn error_bars(current: &RunResult) -> ChartSpec {
    let values = current
        .errors_by_field
        .iter()
        .map(|(field, count)| json!({"field": field, "value": or_zero(Some(*count))}))
        .collect();

    ChartSpec::new(
        ChartSlot::Errors.height(),
        values,
        json!("bar"),
        json!({
            "x": {"field": "field", "type": "nominal", "sort": "-y", "title": "Field"},
            "y": {"field": "value", "type": "quantitative", "title": "Errors", "scale": {"nice": true}},
            "tooltip": [{"field": "value", "type": "quantitative", "title": "Errors"}]
        }),
    )
}

fn format_bars(current: &RunResult) -> ChartSpec {
    let values = current
        .csv_vs_jsonl_tokens
        .iter()
        .map(|r| json!({"format": r.format, "tokens": r.tokens_per_sec}))
        .collect();

    ChartSpec::new(
        ChartSlot::Format.height(),
        values,
        json!("bar"),
        json!({
            "x": {"field": "format", "type": "nominal", "title": "Format"},
            "y": {"field": "tokens", "type": "quantitative", "title": "Tokens/sec", "scale": {"nice": true}},
            "tooltip": [{"field": "tokens", "type": "quantitative"}]
        }),
    )
}

fn compare_bar(slot: ChartSlot, label: &str, current: Option<f64>, baseline: Option<f64>) -> ChartSpec {
    ChartSpec::new(
        slot.height(),
        vec![
            json!({"name": BEFORE, "value": or_zero(baseline)}),
            json!({"name": AFTER, "value": or_zero(current)}),
        ],
        json!("bar"),
        json!({
            "x": {"field": "name", "type": "nominal"},
            "y": {"field": "value", "type": "quantitative", "title": label, "scale": {"nice": true}}
        }),
    )
}
