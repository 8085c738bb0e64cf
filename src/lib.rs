//! `runreport`: static HTML performance reports from benchmark run JSON.
//!
//! A run payload (a bare result, or a `compare` wrapper holding a current
//! run and a baseline) is loaded leniently, turned into KPIs, tables and
//! Vega-Lite chart specs, and written into a single self-contained page.
//! The browser-facing parts sit behind traits ([`document::Document`],
//! [`charts::ChartRenderer`], [`charts::ChartRuntime`]) so the same boot
//! sequence drives both the static writer and the tests.

#![forbid(unsafe_code)]

pub mod artifact;
pub mod charts;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod loader;
pub mod logging;
pub mod model;
pub mod output;
pub mod report;
pub mod theme;
pub mod util;

pub use error::{ErrorCode, ReportError, Result, StructuredError};
pub use model::{ComparisonContext, RunResult};
pub use report::{BootSummary, Orchestrator, Phase};
