// Report build benchmarks.
//
// Run with: cargo bench
//
// Performance Targets:
// | Operation              | Target   | Description                          |
// |------------------------|----------|--------------------------------------|
// | Sanitize + parse (1k)  | < 1ms    | Payload with 1000 series samples     |
// | Chart set (1k)         | < 2ms    | All specs for 1000 series samples    |
// | Boot (1k)              | < 10ms   | Full boot on the default page        |
// | Render page            | < 1ms    | Serialize the default page to HTML   |

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use runreport::charts::{MountConfig, StaticEmbed, VegaAssets, build_chart_set};
use runreport::document::html::render_page;
use runreport::document::{Layout, PageOptions, StaticDocument, report_page};
use runreport::loader::{ContextLoader, InlineText, NoFetch, parse_payload};
use runreport::model::ComparisonContext;
use runreport::report::Orchestrator;
use runreport::theme::{MemoryThemeStore, Palettes};
use runreport::util::{NoPause, RetryPolicy};
use serde_json::{Value, json};
use std::sync::Once;
use std::time::Instant;
use tracing::info;

const SAMPLE_COUNTS: [usize; 3] = [10, 100, 1000];

fn init_bench_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = runreport::logging::init_logging(0, false, None);
    });
}

fn log_group_start(name: &str) {
    info!("benchmark_group_start: name={name}");
}

fn log_group_end(name: &str) {
    info!("benchmark_group_end: name={name}");
}

fn log_bench_start(name: &str) -> Instant {
    info!("benchmark_start: {name}");
    Instant::now()
}

fn log_bench_end(name: &str, started_at: Instant) {
    info!("benchmark_end: {name} duration={:?}", started_at.elapsed());
}

/// A run with `samples` time-series points and every other section filled.
fn run_with_samples(samples: usize) -> Value {
    let series: Vec<Value> = (0..samples)
        .map(|i| {
            json!({
                "time_ms": i * 10,
                "mb_s": 150 + i % 90,
                "rss_mb": 64 + i % 40,
                "allocs_per_sec": 3000 + i % 700,
            })
        })
        .collect();
    json!({
        "rows": 125_000,
        "throughput_mb_s": 210.5,
        "tokens_per_sec": 1_850_000.25,
        "p95_ms": 12.6,
        "wall_time_ms": samples * 10,
        "peak_rss_mb": 96.75,
        "cpu_pct": 87.25,
        "stage_times": [
            {"stage": "parse", "duration_ms": samples * 4},
            {"stage": "write", "duration_ms": samples * 6}
        ],
        "errors_by_field": {"amount": 3, "date": 1},
        "series": series,
        "csv_vs_jsonl_tokens": [
            {"format": "CSV", "tokens_per_sec": 1_850_000, "mb_s": 210},
            {"format": "JSONL", "tokens_per_sec": 1_400_000, "mb_s": 160}
        ]
    })
}

fn default_doc() -> StaticDocument {
    StaticDocument::new(
        report_page(&PageOptions::default()),
        Layout::default(),
        Palettes::default(),
    )
}

fn bench_parse_payload(c: &mut Criterion) {
    init_bench_logging();
    let group_name = "loader/parse";
    log_group_start(group_name);
    let mut group = c.benchmark_group(group_name);

    for samples in SAMPLE_COUNTS {
        // Producers emit bare NaN for metrics they failed to sample.
        let text = run_with_samples(samples)
            .to_string()
            .replacen(r#""cpu_pct":87.25"#, r#""cpu_pct":NaN"#, 1);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &text, |b, text| {
            let bench_name = format!("loader/parse/{samples}");
            let bench_start = log_bench_start(&bench_name);
            b.iter(|| parse_payload(black_box(text), "bench").unwrap());
            log_bench_end(&bench_name, bench_start);
        });
    }

    group.finish();
    log_group_end(group_name);
}

fn bench_chart_set(c: &mut Criterion) {
    init_bench_logging();
    let group_name = "charts/build_set";
    log_group_start(group_name);
    let mut group = c.benchmark_group(group_name);

    for samples in SAMPLE_COUNTS {
        let ctx = ComparisonContext::from_value(run_with_samples(samples));
        group.throughput(Throughput::Elements(samples as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &ctx, |b, ctx| {
            let bench_name = format!("charts/build_set/{samples}");
            let bench_start = log_bench_start(&bench_name);
            b.iter(|| build_chart_set(black_box(ctx)));
            log_bench_end(&bench_name, bench_start);
        });
    }

    group.finish();
    log_group_end(group_name);
}

fn bench_boot(c: &mut Criterion) {
    init_bench_logging();
    let group_name = "report/boot";
    log_group_start(group_name);
    let mut group = c.benchmark_group(group_name);
    let runtime = VegaAssets::default();
    let store = MemoryThemeStore::default();

    for samples in SAMPLE_COUNTS {
        let text = run_with_samples(samples).to_string();
        group.bench_with_input(BenchmarkId::from_parameter(samples), &text, |b, text| {
            let bench_name = format!("report/boot/{samples}");
            let bench_start = log_bench_start(&bench_name);
            b.iter(|| {
                let inline = InlineText::new(text.clone(), "bench");
                let loader = ContextLoader::new(&inline, &NoFetch);
                let mut doc = default_doc();
                let mut orchestrator = Orchestrator::new(
                    &runtime,
                    &StaticEmbed,
                    &NoPause,
                    MountConfig::default(),
                    RetryPolicy::new(40, 100),
                );
                black_box(orchestrator.boot(&mut doc, &loader, &store))
            });
            log_bench_end(&bench_name, bench_start);
        });
    }

    group.finish();
    log_group_end(group_name);
}

fn bench_render_page(c: &mut Criterion) {
    init_bench_logging();
    let group_name = "document/render";
    log_group_start(group_name);
    let mut group = c.benchmark_group(group_name);
    let page = report_page(&PageOptions::default());

    group.bench_function("default_page", |b| {
        let bench_name = "document/render/default_page";
        let bench_start = log_bench_start(bench_name);
        b.iter(|| render_page(black_box(&page)));
        log_bench_end(bench_name, bench_start);
    });

    group.finish();
    log_group_end(group_name);
}

criterion_group!(
    report_benches,
    bench_parse_payload,
    bench_chart_set,
    bench_boot,
    bench_render_page,
);

criterion_main!(report_benches);
