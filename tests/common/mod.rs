#![allow(dead_code)]

pub mod cli;
pub mod fixtures;

use indexmap::IndexMap;
use runreport::document::{Document, Layout, PageOptions, StaticDocument, report_page};
use runreport::theme::{Palettes, ThemeMode};
use std::cell::Cell;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        runreport::logging::init_test_logging();
    });
}

/// The default page at the default viewport.
pub fn default_doc() -> StaticDocument {
    StaticDocument::new(
        report_page(&PageOptions::default()),
        Layout::default(),
        Palettes::default(),
    )
}

/// A document whose chart containers report no width for the first
/// `zero_polls` measurements, then `width`.
pub struct LateLayout {
    pub inner: StaticDocument,
    pub zero_polls: u32,
    pub width: f64,
    pub polls: Cell<u32>,
}

impl LateLayout {
    pub fn new(inner: StaticDocument, zero_polls: u32, width: f64) -> Self {
        Self {
            inner,
            zero_polls,
            width,
            polls: Cell::new(0),
        }
    }
}

impl Document for LateLayout {
    fn contains(&self, id: &str) -> bool {
        self.inner.contains(id)
    }

    fn set_text(&mut self, id: &str, text: &str) -> bool {
        self.inner.set_text(id, text)
    }

    fn set_html(&mut self, id: &str, html: &str) -> bool {
        self.inner.set_html(id, html)
    }

    fn set_descendant_html(&mut self, id: &str, tag: &str, html: &str) -> bool {
        self.inner.set_descendant_html(id, tag, html)
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.inner.inner_html(id)
    }

    fn attr(&self, id: &str, name: &str) -> Option<String> {
        self.inner.attr(id, name)
    }

    fn set_attr(&mut self, id: &str, name: &str, value: &str) -> bool {
        self.inner.set_attr(id, name, value)
    }

    fn style(&self, id: &str, property: &str) -> Option<String> {
        self.inner.style(id, property)
    }

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> bool {
        self.inner.set_style(id, property, value)
    }

    fn remove(&mut self, id: &str) -> bool {
        self.inner.remove(id)
    }

    fn remove_closest(&mut self, id: &str, class: &str) -> bool {
        self.inner.remove_closest(id, class)
    }

    fn remove_links(&mut self, container_class: &str, href: &str) -> usize {
        self.inner.remove_links(container_class, href)
    }

    fn measure_width(&self, _id: &str) -> f64 {
        let n = self.polls.get() + 1;
        self.polls.set(n);
        if n > self.zero_polls { self.width } else { 0.0 }
    }

    fn measure_parent_width(&self, _id: &str) -> f64 {
        0.0
    }

    fn css_vars(&self) -> IndexMap<String, String> {
        self.inner.css_vars()
    }

    fn root_theme(&self) -> ThemeMode {
        self.inner.root_theme()
    }

    fn set_root_theme(&mut self, mode: ThemeMode) {
        self.inner.set_root_theme(mode);
    }

    fn show_error(&mut self, message: &str) {
        self.inner.show_error(message);
    }
}
