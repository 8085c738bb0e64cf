//! Mounting chart specs into the document.
//!
//! A mount waits for the target container to have a width, finalizes the
//! spec against that width and the current theme, and hands it to a
//! [`ChartRenderer`]. Charts with no data are never drawn: their card is
//! removed instead.

use super::ChartSpec;
use crate::document::Document;
use crate::error::{ReportError, Result};
use crate::theme::{ThemeTokens, chart_theme};
use crate::util::{Pause, PollOutcome, RetryPolicy, poll};
use serde::Serialize;
use tracing::{debug, trace};

pub const CARD_CLASS: &str = "chart-card";

/// Class of the script element the static renderer writes.
pub const VEGA_SPEC_CLASS: &str = "vega-spec";

/// Width polling and sizing knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountConfig {
    pub width_attempts: u32,
    pub width_interval_ms: u64,
    /// Width used when every poll measured 0.
    pub fallback_width: f64,
    pub min_width: f64,
    /// Container min-height (px) when the spec has no height.
    pub fallback_min_height: u32,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            width_attempts: 12,
            width_interval_ms: 80,
            fallback_width: 640.0,
            min_width: 220.0,
            fallback_min_height: 236,
        }
    }
}

impl MountConfig {
    #[must_use]
    pub const fn width_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.width_attempts, self.width_interval_ms)
    }
}

/// Options passed through to the embedding call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedOptions {
    pub actions: bool,
    pub renderer: String,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            actions: false,
            renderer: "canvas".to_string(),
        }
    }
}

/// A drawn chart.
pub trait ChartView {
    /// Re-measure and redraw at the container's current size.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be resized.
    fn resize(&mut self) -> Result<()>;
}

/// Draws a finalized spec into a container.
pub trait ChartRenderer {
    /// # Errors
    ///
    /// Returns an error if the spec cannot be rendered into `target`.
    fn embed(
        &self,
        doc: &mut dyn Document,
        target: &str,
        spec: &ChartSpec,
        options: &EmbedOptions,
    ) -> Result<Box<dyn ChartView>>;
}

/// Writes the spec into the container as a JSON script element for the
/// page's bootstrap script to embed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticEmbed;

struct StaticView;

impl ChartView for StaticView {
    fn resize(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ChartRenderer for StaticEmbed {
    fn embed(
        &self,
        doc: &mut dyn Document,
        target: &str,
        spec: &ChartSpec,
        options: &EmbedOptions,
    ) -> Result<Box<dyn ChartView>> {
        let json = serde_json::to_string(spec)?.replace("</", "<\\/");
        let markup = format!(
            r#"<script type="application/json" class="{VEGA_SPEC_CLASS}" data-actions="{}" data-renderer="{}">{json}</script>"#,
            options.actions, options.renderer
        );
        if !doc.set_html(target, &markup) {
            return Err(ReportError::MountNotFound {
                target: target.to_string(),
            });
        }
        Ok(Box::new(StaticView))
    }
}

/// What happened to one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// No such container.
    Skipped,
    /// No data; the card was removed.
    Removed,
    /// Drawn at `width`. `attempt` is the poll that measured it, `None` when
    /// the fallback width was used.
    Rendered { width: u32, attempt: Option<u32> },
}

pub struct ChartMounter<'a> {
    config: MountConfig,
    renderer: &'a dyn ChartRenderer,
    pause: &'a dyn Pause,
    options: EmbedOptions,
}

impl<'a> ChartMounter<'a> {
    #[must_use]
    pub fn new(config: MountConfig, renderer: &'a dyn ChartRenderer, pause: &'a dyn Pause) -> Self {
        Self {
            config,
            renderer,
            pause,
            options: EmbedOptions::default(),
        }
    }

    /// Mount `spec` into `target`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Render` if the renderer fails. The document is
    /// left with an empty container in that case.
    pub fn mount(&self, doc: &mut dyn Document, target: &str, spec: &ChartSpec) -> Result<MountOutcome> {
        if !doc.contains(target) {
            debug!(chart = target, "chart target missing, skipped");
            return Ok(MountOutcome::Skipped);
        }
        if spec.is_empty() {
            doc.remove_closest(target, CARD_CLASS);
            debug!(chart = target, "no chart data, card removed");
            return Ok(MountOutcome::Removed);
        }

        if doc.style(target, "width").is_none() {
            doc.set_style(target, "width", "100%");
        }
        if doc.style(target, "min-height").is_none() {
            let min_height = if spec.height > 0 {
                spec.height + 16
            } else {
                self.config.fallback_min_height
            };
            doc.set_style(target, "min-height", &format!("{min_height}px"));
        }

        let tokens = ThemeTokens::from_css_vars(&doc.css_vars());
        let theme = serde_json::to_value(chart_theme(&tokens))?;

        let measured = poll(self.config.width_policy(), self.pause, || {
            let own = doc.measure_width(target);
            let width = if own > 0.0 {
                own
            } else {
                doc.measure_parent_width(target)
            };
            trace!(chart = target, width, "measured chart container");
            (width > 0.0).then_some(width)
        });
        let (width, attempt) = match measured {
            PollOutcome::Ready { value, attempt } => (value, Some(attempt)),
            PollOutcome::TimedOut { attempts } => {
                debug!(chart = target, attempts, "container never laid out, using fallback width");
                (self.config.fallback_width, None)
            }
        };

        let finalized = spec.with_autosize(width, self.config.min_width, &theme);
        let mut view = self
            .renderer
            .embed(doc, target, &finalized, &self.options)
            .map_err(|e| ReportError::render(target, e.to_string()))?;
        if let Err(e) = view.resize() {
            trace!(chart = target, error = %e, "resize failed");
        }

        let width = finalized.width.unwrap_or_default();
        debug!(chart = target, width, "chart rendered");
        Ok(MountOutcome::Rendered { width, attempt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartSlot, build_spec};
    use crate::document::{Layout, PageOptions, StaticDocument, report_page};
    use crate::model::ComparisonContext;
    use crate::theme::Palettes;
    use crate::util::NoPause;
    use serde_json::json;

    fn doc(viewport: f64) -> StaticDocument {
        StaticDocument::new(
            report_page(&PageOptions::default()),
            Layout {
                viewport_width: viewport,
            },
            Palettes::default(),
        )
    }

    fn throughput() -> ChartSpec {
        let ctx = ComparisonContext::from_value(json!({"throughput_mb_s": 5, "wall_time_ms": 10}));
        build_spec(ChartSlot::Throughput, &ctx)
    }

    struct Failing;

    impl ChartRenderer for Failing {
        fn embed(
            &self,
            _doc: &mut dyn Document,
            _target: &str,
            _spec: &ChartSpec,
            _options: &EmbedOptions,
        ) -> Result<Box<dyn ChartView>> {
            Err(ReportError::Other(anyhow::anyhow!("boom")))
        }
    }

    #[test]
    fn missing_target_is_skipped() {
        let mut doc = doc(1200.0);
        let mounter = ChartMounter::new(MountConfig::default(), &StaticEmbed, &NoPause);
        let outcome = mounter.mount(&mut doc, "chart-nowhere", &throughput()).unwrap();
        assert_eq!(outcome, MountOutcome::Skipped);
    }

    #[test]
    fn empty_spec_removes_card() {
        let mut doc = doc(1200.0);
        let spec = build_spec(ChartSlot::Errors, &ComparisonContext::empty());
        let mounter = ChartMounter::new(MountConfig::default(), &StaticEmbed, &NoPause);
        assert_eq!(
            mounter.mount(&mut doc, "chart-errors", &spec).unwrap(),
            MountOutcome::Removed
        );
        assert!(!doc.contains("chart-errors"));
        assert!(!doc.to_html().contains("Errors by field"));
    }

    #[test]
    fn rendered_spec_is_finalized() {
        let mut doc = doc(1200.0);
        let mounter = ChartMounter::new(MountConfig::default(), &StaticEmbed, &NoPause);
        let outcome = mounter.mount(&mut doc, "chart-throughput", &throughput()).unwrap();
        let expected = Layout::default().card_width(true) - 28.0;
        assert_eq!(
            outcome,
            MountOutcome::Rendered {
                width: expected.floor() as u32,
                attempt: Some(1)
            }
        );

        assert_eq!(doc.style("chart-throughput", "width").as_deref(), Some("100%"));
        assert_eq!(
            doc.style("chart-throughput", "min-height").as_deref(),
            Some("236px")
        );
        let html = doc.inner_html("chart-throughput").unwrap();
        assert!(html.starts_with(r#"<script type="application/json" class="vega-spec" data-actions="false" data-renderer="canvas">"#));
        assert!(html.contains(r#""autosize":{"type":"fit","contains":"padding"}"#));
        assert!(html.contains(r##""labelColor":"#e6ebf3""##));
    }

    #[test]
    fn zero_width_uses_fallback() {
        let mut doc = doc(0.0);
        let mounter = ChartMounter::new(MountConfig::default(), &StaticEmbed, &NoPause);
        let outcome = mounter.mount(&mut doc, "chart-rss", &throughput()).unwrap();
        assert_eq!(
            outcome,
            MountOutcome::Rendered {
                width: 640,
                attempt: None
            }
        );
    }

    #[test]
    fn existing_styles_are_kept() {
        let mut doc = doc(1200.0);
        doc.set_style("chart-rss", "min-height", "400px");
        let mounter = ChartMounter::new(MountConfig::default(), &StaticEmbed, &NoPause);
        mounter.mount(&mut doc, "chart-rss", &throughput()).unwrap();
        assert_eq!(doc.style("chart-rss", "min-height").as_deref(), Some("400px"));
    }

    #[test]
    fn renderer_failure_is_a_render_error() {
        let mut doc = doc(1200.0);
        let mounter = ChartMounter::new(MountConfig::default(), &Failing, &NoPause);
        let err = mounter.mount(&mut doc, "chart-rss", &throughput()).unwrap_err();
        assert_eq!(err.to_string(), "Render failed for #chart-rss: boom");
    }

    #[test]
    fn light_theme_reaches_the_spec() {
        let mut doc = doc(1200.0);
        doc.set_root_theme(crate::theme::ThemeMode::Light);
        let mounter = ChartMounter::new(MountConfig::default(), &StaticEmbed, &NoPause);
        mounter.mount(&mut doc, "chart-rss", &throughput()).unwrap();
        let html = doc.inner_html("chart-rss").unwrap();
        assert!(html.contains(r##""labelColor":"#1b2330""##));
    }
}
