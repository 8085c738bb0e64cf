//! Boot sequence and theme-toggle redraw.
//!
//! Phases run in a fixed order: load the context, write KPIs and tables,
//! wait for the chart runtime, draw charts. Every failure along the way is
//! shown as a banner and recorded; none of them stops the sequence.

use super::kpis::mount_kpis;
use super::tables::render_tables;
use crate::charts::{
    ChartMounter, ChartRenderer, ChartRuntime, ChartSlot, MountConfig, MountOutcome,
    build_chart_set, wait_for_runtime,
};
use crate::document::Document;
use crate::error::{ReportError, Result, StructuredError};
use crate::loader::{ContextLoader, LoadOrigin};
use crate::model::ComparisonContext;
use crate::theme::{ThemeMode, ThemeStore};
use crate::util::{Pause, PollOutcome, RetryPolicy};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const COMPARISON_PANEL_ID: &str = "comparison";
pub const TOC_CLASS: &str = "toc";
pub const RUNTIME_MISSING_MESSAGE: &str = "Vega libraries not loaded — charts skipped";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    KpisAndTablesRendered,
    WaitingForChartLibrary,
    ChartsRendered,
}

/// What happened to one chart slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRecord {
    pub id: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl ChartRecord {
    fn new(slot: ChartSlot, outcome: Option<MountOutcome>) -> Self {
        let (status, width) = match outcome {
            Some(MountOutcome::Skipped) => ("skipped", None),
            Some(MountOutcome::Removed) => ("removed", None),
            Some(MountOutcome::Rendered { width, .. }) => ("rendered", Some(width)),
            None => ("failed", None),
        };
        Self {
            id: slot.mount_id(),
            status,
            width,
        }
    }
}

/// Outcome of a boot.
#[derive(Debug, Clone, Serialize)]
pub struct BootSummary {
    pub phase: Phase,
    pub origin: LoadOrigin,
    pub theme: ThemeMode,
    pub has_baseline: bool,
    pub charts: Vec<ChartRecord>,
    pub errors: Vec<String>,
    /// Set when the chart phase was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_error: Option<StructuredError>,
}

/// Drives one report page.
pub struct Orchestrator<'a> {
    runtime: &'a dyn ChartRuntime,
    renderer: &'a dyn ChartRenderer,
    pause: &'a dyn Pause,
    mount: MountConfig,
    runtime_policy: RetryPolicy,
    forced_theme: Option<ThemeMode>,
    context: ComparisonContext,
    phase: Phase,
    errors: Vec<String>,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(
        runtime: &'a dyn ChartRuntime,
        renderer: &'a dyn ChartRenderer,
        pause: &'a dyn Pause,
        mount: MountConfig,
        runtime_policy: RetryPolicy,
    ) -> Self {
        Self {
            runtime,
            renderer,
            pause,
            mount,
            runtime_policy,
            forced_theme: None,
            context: ComparisonContext::empty(),
            phase: Phase::Loading,
            errors: Vec::new(),
        }
    }

    /// Use `mode` instead of the stored preference.
    #[must_use]
    pub const fn with_theme(mut self, mode: Option<ThemeMode>) -> Self {
        self.forced_theme = mode;
        self
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn context(&self) -> &ComparisonContext {
        &self.context
    }

    /// Banner messages raised so far.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn report_error(&mut self, doc: &mut dyn Document, message: String) {
        warn!("{message}");
        doc.show_error(&message);
        self.errors.push(message);
    }

    /// Run the full boot sequence.
    pub fn boot(
        &mut self,
        doc: &mut dyn Document,
        loader: &ContextLoader<'_>,
        store: &dyn ThemeStore,
    ) -> BootSummary {
        self.phase = Phase::Loading;
        let loaded = loader.load();
        if let Some(message) = loaded.error {
            self.report_error(doc, message);
        }
        self.context = loaded.context;

        if let Some(mode) = self.forced_theme.or_else(|| store.load()) {
            doc.set_root_theme(mode);
        }

        let written = mount_kpis(doc, &self.context.current, self.context.baseline.as_ref());
        debug!(written, "KPIs mounted");
        if let Err(e) = render_tables(doc, &self.context.current, &self.context.current_raw) {
            self.report_error(doc, format!("Tables failed: {e}"));
        }
        self.phase = Phase::KpisAndTablesRendered;
        info!(origin = ?loaded.origin, "KPIs and tables rendered");

        self.phase = Phase::WaitingForChartLibrary;
        let mut runtime_error = None;
        let charts = match wait_for_runtime(self.runtime, self.runtime_policy, self.pause) {
            PollOutcome::Ready { attempt, .. } => {
                debug!(attempt, "chart runtime ready");
                let records = self.render_charts(doc);
                self.phase = Phase::ChartsRendered;
                info!(charts = records.len(), "charts rendered");
                records
            }
            PollOutcome::TimedOut { attempts } => {
                let err = ReportError::ChartRuntimeUnavailable { attempts };
                warn!(
                    error = %err,
                    waited = ?self.runtime_policy.ceiling(),
                    runtime = %self.runtime.describe(),
                    "chart phase skipped"
                );
                runtime_error = Some(StructuredError::from_error(&err));
                self.report_error(doc, RUNTIME_MISSING_MESSAGE.to_string());
                Vec::new()
            }
        };

        BootSummary {
            phase: self.phase,
            origin: loaded.origin,
            theme: doc.root_theme(),
            has_baseline: self.context.has_baseline(),
            charts,
            errors: self.errors.clone(),
            runtime_error,
        }
    }

    fn render_charts(&mut self, doc: &mut dyn Document) -> Vec<ChartRecord> {
        let mounter = ChartMounter::new(self.mount, self.renderer, self.pause);
        let mut records = Vec::new();
        let mut failures = Vec::new();

        for (slot, spec) in build_chart_set(&self.context) {
            match mounter.mount(doc, slot.mount_id(), &spec) {
                Ok(outcome) => records.push(ChartRecord::new(slot, Some(outcome))),
                Err(e) => {
                    failures.push(format!("vegaEmbed failed: {e}"));
                    records.push(ChartRecord::new(slot, None));
                }
            }
        }

        if !self.context.has_baseline() {
            let panel = doc.remove(COMPARISON_PANEL_ID);
            let links = doc.remove_links(TOC_CLASS, &format!("#{COMPARISON_PANEL_ID}"));
            debug!(panel, links, "no baseline, comparison removed");
        }

        for message in failures {
            self.report_error(doc, message);
        }
        records
    }

    /// Clear every chart container and draw the chart set again from the
    /// loaded context.
    pub fn redraw_charts(&mut self, doc: &mut dyn Document) -> Vec<ChartRecord> {
        for slot in ChartSlot::ALL {
            doc.clear(slot.mount_id());
        }
        self.render_charts(doc)
    }

    /// Flip the theme, persist it, and redraw charts when the runtime is
    /// available.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be saved. The page theme is
    /// switched and charts are redrawn regardless.
    pub fn toggle_theme(
        &mut self,
        doc: &mut dyn Document,
        store: &mut dyn ThemeStore,
    ) -> Result<ThemeMode> {
        let next = doc.root_theme().toggled();
        doc.set_root_theme(next);
        info!(theme = %next, "theme toggled");
        let saved = store.save(next);
        if self.runtime.is_ready() {
            self.redraw_charts(doc);
        }
        saved?;
        Ok(next)
    }
}
