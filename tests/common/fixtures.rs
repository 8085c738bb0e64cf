use serde_json::{Value, json};

/// A single run with every section populated.
pub fn full_run() -> Value {
    json!({
        "rows": 125_000,
        "bytes": 52_428_800,
        "throughput_mb_s": 210.5,
        "tokens_per_sec": 1_850_000.25,
        "allocs_per_sec": 3400,
        "p50_ms": 4.2,
        "p95_ms": 12.6,
        "wall_time_ms": 100,
        "peak_rss_mb": 96.75,
        "cpu_pct": 87.25,
        "filename": "simple.csv",
        "content_type": "text/csv",
        "etag": "\"abc123\"",
        "file_size": 52_428_800,
        "stage_times": [
            {"stage": "parse", "duration_ms": 50},
            {"stage": "write", "duration_ms": 50}
        ],
        "errors_by_field": {"amount": 3, "date": 1},
        "series": [
            {"time_ms": 0, "mb_s": 180, "rss_mb": 64, "allocs_per_sec": 3000},
            {"time_ms": 50, "mb_s": 220, "rss_mb": 90, "allocs_per_sec": 3500},
            {"time_ms": 100, "mb_s": 210, "rss_mb": 96, "allocs_per_sec": 3400}
        ],
        "csv_vs_jsonl_tokens": [
            {"format": "CSV", "tokens_per_sec": 1_850_000, "mb_s": 210},
            {"format": "JSONL", "tokens_per_sec": 1_400_000, "mb_s": 160}
        ]
    })
}

/// A comparison wrapper around two runs.
pub fn compare_payload() -> Value {
    let mut before = full_run();
    before["p95_ms"] = json!(15.0);
    before["tokens_per_sec"] = json!(1_500_000);
    json!({"compare": {"after": full_run(), "before": before}})
}

/// A run with nothing but a wall time: every optional chart is empty.
pub fn sparse_run() -> Value {
    json!({"wall_time_ms": 1530, "rows": 10})
}
