//! Page rendering: KPIs, tables and the boot sequence that ties them to
//! the charts.

pub mod kpis;
pub mod orchestrator;
pub mod tables;

pub use kpis::{COMPARE_HOST_ID, compare_markup, mount_kpis};
pub use orchestrator::{
    BootSummary, COMPARISON_PANEL_ID, ChartRecord, Orchestrator, Phase, RUNTIME_MISSING_MESSAGE,
};
pub use tables::{DOWNLOAD_LINK_ID, download_uri, render_tables};
