//! The default report page.
//!
//! Every mount point the renderers know about exists here. Pages built from
//! other templates may leave any of them out.

use super::dom::Element;
use super::html::{BOOTSTRAP_JS, stylesheet};
use crate::charts::ChartSlot;
use crate::loader::RUN_DATA_ID;
use crate::theme::{Palettes, ThemeMode, chart_theme};
use serde_json::json;

pub const CHART_THEMES_ID: &str = "chart-themes";

const KPIS: [(&str, &str); 11] = [
    ("kpi-rows", "Rows"),
    ("kpi-mbs", "Throughput (MB/s)"),
    ("kpi-tokens", "Tokens/sec"),
    ("kpi-allocs", "Allocs/sec"),
    ("kpi-p95", "p95 latency"),
    ("kpi-rss", "Peak RSS"),
    ("kpi-cpu", "CPU"),
    ("kpi-file", "File"),
    ("kpi-type", "Content-Type"),
    ("kpi-size", "Size (bytes)"),
    ("kpi-etag", "ETag"),
];

const SECTIONS: [(&str, &str); 5] = [
    ("overview", "Overview"),
    ("comparison", "Comparison"),
    ("timeline", "Timeline"),
    ("breakdown", "Breakdown"),
    ("tables", "Tables"),
];

/// What varies between pages.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    pub title: String,
    pub theme: ThemeMode,
    pub palettes: Palettes,
    /// `src` of each chart library script, in load order.
    pub scripts: Vec<String>,
    /// `href` of an extra stylesheet.
    pub stylesheet: Option<String>,
}

/// Build the default page.
#[must_use]
pub fn report_page(options: &PageOptions) -> Element {
    Element::new("html")
        .attr("lang", "en")
        .attr("data-theme", options.theme.as_str())
        .child(head(options))
        .child(body(options))
}

fn head(options: &PageOptions) -> Element {
    let mut head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(Element::new("title").text(&options.title))
        .child(Element::new("style").text(&stylesheet(&options.palettes)));
    if let Some(href) = &options.stylesheet {
        head = head.child(
            Element::new("link")
                .attr("rel", "stylesheet")
                .attr("href", href),
        );
    }
    head.children(
        options
            .scripts
            .iter()
            .map(|src| Element::new("script").attr("src", src)),
    )
}

fn body(options: &PageOptions) -> Element {
    let themes = json!({
        "dark": chart_theme(options.palettes.get(ThemeMode::Dark)),
        "light": chart_theme(options.palettes.get(ThemeMode::Light)),
    });

    Element::new("body")
        .child(topbar(&options.title))
        .child(toc())
        .child(
            Element::new("main")
                .child(overview())
                .child(comparison())
                .child(section(
                    "timeline",
                    "Timeline",
                    [ChartSlot::Throughput, ChartSlot::Rss, ChartSlot::Allocs],
                ))
                .child(section(
                    "breakdown",
                    "Breakdown",
                    [ChartSlot::Stages, ChartSlot::Errors, ChartSlot::Format],
                ))
                .child(tables()),
        )
        .child(Element::new("div").id(super::ERROR_STACK_ID).class("error-stack"))
        .child(
            Element::new("script")
                .id(RUN_DATA_ID)
                .attr("type", "application/json")
                .text("{}"),
        )
        .child(
            Element::new("script")
                .id(CHART_THEMES_ID)
                .attr("type", "application/json")
                .text(&themes.to_string()),
        )
        .child(Element::new("script").text(BOOTSTRAP_JS))
}

fn topbar(title: &str) -> Element {
    Element::new("header")
        .class("topbar")
        .child(Element::new("h1").text(title))
        .child(
            Element::new("a")
                .id("download-json")
                .attr("href", "#")
                .attr("download", "run.json")
                .text("Download JSON"),
        )
        .child(
            Element::new("button")
                .id("toggle-theme")
                .attr("type", "button")
                .text("Toggle theme"),
        )
}

fn toc() -> Element {
    Element::new("nav").class("toc").children(
        SECTIONS
            .iter()
            .map(|(id, label)| Element::new("a").attr("href", &format!("#{id}")).text(label)),
    )
}

fn panel(id: &str, title: &str) -> Element {
    Element::new("section")
        .id(id)
        .class("panel")
        .child(Element::new("h2").text(title))
}

fn overview() -> Element {
    panel("overview", "Overview").child(Element::new("div").class("kpi-grid").children(
        KPIS.iter().map(|(id, label)| {
            Element::new("div")
                .class("kpi")
                .child(Element::new("div").class("kpi-label").text(label))
                .child(Element::new("div").id(id).class("kpi-value").text("—"))
        }),
    ))
}

fn comparison() -> Element {
    panel("comparison", "Comparison")
        .child(Element::new("div").id("compare-kpis").class("compare-grid"))
        .child(
            Element::new("div").class("grid").children(
                [
                    ChartSlot::CompareTokens,
                    ChartSlot::CompareMbs,
                    ChartSlot::CompareLatency,
                    ChartSlot::CompareRss,
                ]
                .into_iter()
                .map(chart_card),
            ),
        )
}

fn section(id: &str, title: &str, slots: [ChartSlot; 3]) -> Element {
    panel(id, title).child(
        Element::new("div")
            .class("grid")
            .children(slots.into_iter().map(chart_card)),
    )
}

fn chart_card(slot: ChartSlot) -> Element {
    let mut card = Element::new("div").class("chart-card");
    if slot.is_wide() {
        card = card.class("wide");
    }
    card.child(Element::new("h3").text(slot.title()))
        .child(Element::new("div").id(slot.mount_id()).class("chart"))
}

fn table(id: &str, headers: &[(&str, bool)]) -> Element {
    let header_row = Element::new("tr").children(headers.iter().map(|(label, numeric)| {
        let th = Element::new("th").text(label);
        if *numeric { th.class("num") } else { th }
    }));
    Element::new("table")
        .id(id)
        .child(Element::new("thead").child(header_row))
        .child(Element::new("tbody"))
}

fn tables() -> Element {
    panel("tables", "Tables")
        .child(table("tbl-input-meta", &[("Field", false), ("Value", false)]))
        .child(table(
            "tbl-stage",
            &[("Stage", false), ("Duration", true), ("Share", true)],
        ))
        .child(table("tbl-errors", &[("Field", false), ("Errors", true)]))
        .child(table(
            "tbl-format",
            &[("Format", false), ("Tokens/sec", true), ("MB/s", true)],
        ))
}
