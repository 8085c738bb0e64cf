//! In-memory element tree.

use super::{BANNER_PREFIX, Document, ERROR_STACK_ID, html};
use crate::theme::{Palettes, ThemeMode};
use indexmap::IndexMap;
use tracing::error;

const PAGE_PADDING: f64 = 24.0;
const MAX_CONTENT_WIDTH: f64 = 1280.0;
const GRID_GAP: f64 = 16.0;
const CARD_PADDING: f64 = 14.0;
const CARD_CLASS: &str = "chart-card";
const WIDE_CLASS: &str = "wide";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Text, escaped on output.
    Text(String),
    /// Markup, emitted verbatim.
    Raw(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        match self.attrs.get_mut("class") {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(class);
            }
            None => {
                self.attrs.insert("class".to_string(), class.to_string());
            }
        }
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    #[must_use]
    pub fn raw(mut self, markup: &str) -> Self {
        self.children.push(Node::Raw(markup.to_string()));
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Inline style declarations in source order.
    #[must_use]
    pub fn styles(&self) -> IndexMap<String, String> {
        self.get_attr("style").map(parse_style).unwrap_or_default()
    }

    fn set_style(&mut self, property: &str, value: &str) {
        let mut styles = self.styles();
        styles.insert(property.to_string(), value.to_string());
        let joined = styles
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(";");
        self.attrs.insert("style".to_string(), joined);
    }

    fn is_hidden(&self) -> bool {
        self.attrs.contains_key("hidden")
            || self
                .styles()
                .get("display")
                .is_some_and(|d| d.trim() == "none")
    }

    fn child_element(&self, index: usize) -> Option<&Self> {
        match self.children.get(index)? {
            Node::Element(el) => Some(el),
            Node::Text(_) | Node::Raw(_) => None,
        }
    }

    fn child_element_mut(&mut self, index: usize) -> Option<&mut Self> {
        match self.children.get_mut(index)? {
            Node::Element(el) => Some(el),
            Node::Text(_) | Node::Raw(_) => None,
        }
    }

    /// Remove descendant elements matching `pred`, at any depth.
    fn remove_descendants(&mut self, pred: &dyn Fn(&Self) -> bool) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, Node::Element(el) if pred(el)));
        let mut removed = before - self.children.len();
        for node in &mut self.children {
            if let Node::Element(el) = node {
                removed += el.remove_descendants(pred);
            }
        }
        removed
    }

    fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut Self)) {
        f(self);
        for node in &mut self.children {
            if let Node::Element(el) = node {
                el.for_each_mut(f);
            }
        }
    }
}

fn parse_style(style: &str) -> IndexMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim();
            (!k.is_empty()).then(|| (k.to_ascii_lowercase(), v.trim().to_string()))
        })
        .collect()
}

/// Find the child-index path to the first element matching `pred`.
fn find_path(el: &Element, pred: &dyn Fn(&Element) -> bool, path: &mut Vec<usize>) -> bool {
    if pred(el) {
        return true;
    }
    for (i, node) in el.children.iter().enumerate() {
        if let Node::Element(child) = node {
            path.push(i);
            if find_path(child, pred, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

/// Page geometry used to estimate element widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub viewport_width: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            viewport_width: 1200.0,
        }
    }
}

impl Layout {
    #[must_use]
    pub fn content_width(&self) -> f64 {
        (self.viewport_width.min(MAX_CONTENT_WIDTH) - 2.0 * PAGE_PADDING).max(0.0)
    }

    /// Outer width of a chart card. Wide cards span both grid columns.
    #[must_use]
    pub fn card_width(&self, wide: bool) -> f64 {
        let content = self.content_width();
        if wide {
            content
        } else {
            ((content - GRID_GAP) / 2.0).max(0.0)
        }
    }
}

/// A report page held in memory.
#[derive(Debug, Clone)]
pub struct StaticDocument {
    root: Element,
    layout: Layout,
    palettes: Palettes,
}

impl StaticDocument {
    #[must_use]
    pub const fn new(root: Element, layout: Layout, palettes: Palettes) -> Self {
        Self {
            root,
            layout,
            palettes,
        }
    }

    #[must_use]
    pub const fn root(&self) -> &Element {
        &self.root
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Element> {
        let path = self.path_of(id)?;
        self.at(&path)
    }

    /// Messages of the banners shown so far, prefix included.
    #[must_use]
    pub fn banners(&self) -> Vec<String> {
        let Some(stack) = self.find(ERROR_STACK_ID) else {
            return Vec::new();
        };
        stack
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Element(el) => Some(html::text_content(el)),
                Node::Text(_) | Node::Raw(_) => None,
            })
            .collect()
    }

    /// Serialize the page.
    #[must_use]
    pub fn to_html(&self) -> String {
        html::render_page(&self.root)
    }

    fn path_of(&self, id: &str) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        find_path(&self.root, &|el| el.get_attr("id") == Some(id), &mut path).then_some(path)
    }

    fn at(&self, path: &[usize]) -> Option<&Element> {
        let mut el = &self.root;
        for &i in path {
            el = el.child_element(i)?;
        }
        Some(el)
    }

    fn at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut el = &mut self.root;
        for &i in path {
            el = el.child_element_mut(i)?;
        }
        Some(el)
    }

    fn with_mut(&mut self, id: &str, f: impl FnOnce(&mut Element)) -> bool {
        let Some(path) = self.path_of(id) else {
            return false;
        };
        match self.at_mut(&path) {
            Some(el) => {
                f(el);
                true
            }
            None => false,
        }
    }

    fn remove_at(&mut self, path: &[usize]) -> bool {
        let Some((&last, parent_path)) = path.split_last() else {
            return false;
        };
        match self.at_mut(parent_path) {
            Some(parent) if last < parent.children.len() => {
                parent.children.remove(last);
                true
            }
            _ => false,
        }
    }

    /// Elements from the root down to the one at `path`.
    fn chain(&self, path: &[usize]) -> Vec<&Element> {
        let mut chain = vec![&self.root];
        let mut el = &self.root;
        for &i in path {
            match el.child_element(i) {
                Some(child) => {
                    chain.push(child);
                    el = child;
                }
                None => break,
            }
        }
        chain
    }

    fn width_at(&self, path: &[usize]) -> f64 {
        let chain = self.chain(path);
        if chain.iter().any(|el| el.is_hidden()) {
            return 0.0;
        }
        let Some((pos, card)) = chain
            .iter()
            .enumerate()
            .rev()
            .find(|(_, el)| el.has_class(CARD_CLASS))
        else {
            return self.layout.content_width();
        };
        let card_width = self.layout.card_width(card.has_class(WIDE_CLASS));
        if pos == chain.len() - 1 {
            card_width
        } else {
            (card_width - 2.0 * CARD_PADDING).max(0.0)
        }
    }
}

impl Document for StaticDocument {
    fn contains(&self, id: &str) -> bool {
        self.path_of(id).is_some()
    }

    fn set_text(&mut self, id: &str, text: &str) -> bool {
        self.with_mut(id, |el| el.children = vec![Node::Text(text.to_string())])
    }

    fn set_html(&mut self, id: &str, markup: &str) -> bool {
        self.with_mut(id, |el| {
            el.children = if markup.is_empty() {
                Vec::new()
            } else {
                vec![Node::Raw(markup.to_string())]
            };
        })
    }

    fn set_descendant_html(&mut self, id: &str, tag: &str, markup: &str) -> bool {
        let Some(mut path) = self.path_of(id) else {
            return false;
        };
        let Some(host) = self.at(&path) else {
            return false;
        };
        let mut sub = Vec::new();
        if !find_path(host, &|el| el.tag == tag, &mut sub) || sub.is_empty() {
            return false;
        }
        path.extend(sub);
        match self.at_mut(&path) {
            Some(el) => {
                el.children = vec![Node::Raw(markup.to_string())];
                true
            }
            None => false,
        }
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.find(id).map(html::inner_html)
    }

    fn attr(&self, id: &str, name: &str) -> Option<String> {
        self.find(id)?.get_attr(name).map(str::to_string)
    }

    fn set_attr(&mut self, id: &str, name: &str, value: &str) -> bool {
        self.with_mut(id, |el| {
            el.attrs.insert(name.to_string(), value.to_string());
        })
    }

    fn style(&self, id: &str, property: &str) -> Option<String> {
        self.find(id)?
            .styles()
            .get(&property.to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> bool {
        self.with_mut(id, |el| el.set_style(&property.to_ascii_lowercase(), value))
    }

    fn remove(&mut self, id: &str) -> bool {
        self.path_of(id).is_some_and(|path| self.remove_at(&path))
    }

    fn remove_closest(&mut self, id: &str, class: &str) -> bool {
        let Some(path) = self.path_of(id) else {
            return false;
        };
        let chain = self.chain(&path);
        let Some(depth) = chain.iter().rposition(|el| el.has_class(class)) else {
            return false;
        };
        self.remove_at(&path[..depth])
    }

    fn remove_links(&mut self, container_class: &str, href: &str) -> usize {
        let mut removed = 0;
        self.root.for_each_mut(&mut |el| {
            if el.has_class(container_class) {
                removed += el.remove_descendants(&|a| a.tag == "a" && a.get_attr("href") == Some(href));
            }
        });
        removed
    }

    fn measure_width(&self, id: &str) -> f64 {
        self.path_of(id).map_or(0.0, |path| self.width_at(&path))
    }

    fn measure_parent_width(&self, id: &str) -> f64 {
        match self.path_of(id) {
            Some(path) if !path.is_empty() => self.width_at(&path[..path.len() - 1]),
            _ => 0.0,
        }
    }

    fn css_vars(&self) -> IndexMap<String, String> {
        self.palettes.get(self.root_theme()).css_vars()
    }

    fn root_theme(&self) -> ThemeMode {
        self.root
            .get_attr("data-theme")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    fn set_root_theme(&mut self, mode: ThemeMode) {
        self.root
            .attrs
            .insert("data-theme".to_string(), mode.as_str().to_string());
    }

    fn show_error(&mut self, message: &str) {
        error!("[report] {message}");
        let banner = Element::new("div")
            .class("report-error")
            .attr("role", "alert")
            .text(&format!("{BANNER_PREFIX}{message}"));
        if !self.contains(ERROR_STACK_ID) {
            let stack = Element::new("div").id(ERROR_STACK_ID).class("error-stack");
            let body = self.path_of_tag("body");
            let host = body.as_deref().and_then(|p| self.at_mut(p));
            match host {
                Some(body) => body.children.push(Node::Element(stack)),
                None => self.root.children.push(Node::Element(stack)),
            }
        }
        self.with_mut(ERROR_STACK_ID, |stack| stack.children.push(Node::Element(banner)));
    }
}

impl StaticDocument {
    fn path_of_tag(&self, tag: &str) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        find_path(&self.root, &|el| el.tag == tag, &mut path).then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> StaticDocument {
        let root = Element::new("html").child(
            Element::new("body")
                .child(
                    Element::new("nav")
                        .class("toc")
                        .child(Element::new("a").attr("href", "#overview").text("Overview"))
                        .child(Element::new("a").attr("href", "#comparison").text("Comparison")),
                )
                .child(
                    Element::new("section").id("comparison").child(
                        Element::new("div")
                            .class("chart-card")
                            .child(Element::new("div").id("chart-a")),
                    ),
                )
                .child(
                    Element::new("div")
                        .class("chart-card wide")
                        .child(Element::new("div").id("chart-wide")),
                )
                .child(
                    Element::new("div")
                        .attr("hidden", "")
                        .child(Element::new("div").id("chart-hidden")),
                )
                .child(
                    Element::new("table")
                        .id("tbl")
                        .child(Element::new("thead"))
                        .child(Element::new("tbody")),
                ),
        );
        StaticDocument::new(root, Layout::default(), Palettes::default())
    }

    #[test]
    fn missing_ids_are_no_ops() {
        let mut doc = page();
        assert!(!doc.set_text("nope", "x"));
        assert!(!doc.remove("nope"));
        assert!(!doc.remove_closest("nope", "chart-card"));
        assert!((doc.measure_width("nope")).abs() < f64::EPSILON);
    }

    #[test]
    fn text_is_escaped_markup_is_not() {
        let mut doc = page();
        doc.set_text("chart-a", "<b>");
        assert_eq!(doc.inner_html("chart-a").unwrap(), "&lt;b&gt;");
        doc.set_html("chart-a", "<b>x</b>");
        assert_eq!(doc.inner_html("chart-a").unwrap(), "<b>x</b>");
        doc.clear("chart-a");
        assert_eq!(doc.inner_html("chart-a").unwrap(), "");
    }

    #[test]
    fn descendant_html_targets_tbody() {
        let mut doc = page();
        assert!(doc.set_descendant_html("tbl", "tbody", "<tr><td>1</td></tr>"));
        let html = doc.inner_html("tbl").unwrap();
        assert!(html.contains("<thead></thead><tbody><tr><td>1</td></tr></tbody>"));
    }

    #[test]
    fn remove_closest_card() {
        let mut doc = page();
        assert!(doc.remove_closest("chart-a", "chart-card"));
        assert!(!doc.contains("chart-a"));
        assert!(doc.contains("comparison"));
    }

    #[test]
    fn remove_toc_link() {
        let mut doc = page();
        assert_eq!(doc.remove_links("toc", "#comparison"), 1);
        assert_eq!(doc.remove_links("toc", "#comparison"), 0);
        assert!(doc.to_html().contains("href=\"#overview\""));
    }

    #[test]
    fn widths_follow_layout() {
        let doc = page();
        let layout = Layout::default();
        assert!((doc.measure_width("chart-wide") - (layout.card_width(true) - 28.0)).abs() < 1e-9);
        assert!((doc.measure_parent_width("chart-a") - layout.card_width(false)).abs() < 1e-9);
        assert!(doc.measure_width("chart-hidden").abs() < f64::EPSILON);
    }

    #[test]
    fn styles_round_trip() {
        let mut doc = page();
        assert!(doc.style("chart-a", "width").is_none());
        doc.set_style("chart-a", "width", "100%");
        doc.set_style("chart-a", "min-height", "236px");
        assert_eq!(doc.style("chart-a", "width").as_deref(), Some("100%"));
        assert_eq!(
            doc.attr("chart-a", "style").as_deref(),
            Some("width:100%;min-height:236px")
        );
    }

    #[test]
    fn banners_stack() {
        let mut doc = page();
        doc.show_error("first");
        doc.show_error("second");
        assert_eq!(
            doc.banners(),
            vec!["Report error: first", "Report error: second"]
        );
    }

    #[test]
    fn root_theme_drives_css_vars() {
        let mut doc = page();
        assert_eq!(doc.root_theme(), ThemeMode::Dark);
        doc.set_root_theme(ThemeMode::Light);
        assert_eq!(doc.css_vars()["--text"], "#1b2330");
    }
}
