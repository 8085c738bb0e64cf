//! The document the report is written into.
//!
//! Renderers never assume a particular page: they address elements by id
//! through the [`Document`] trait, and every target is optional. A call
//! against a missing id is a no-op that reports `false`.
//!
//! [`StaticDocument`] is the implementation used for writing report files:
//! an element tree built from the default page template, with a simple
//! layout model for width measurement.

pub mod dom;
pub mod html;
pub mod template;

pub use dom::{Element, Layout, Node, StaticDocument};
pub use template::{PageOptions, report_page};

use crate::theme::ThemeMode;
use indexmap::IndexMap;

/// Element that collects error banners.
pub const ERROR_STACK_ID: &str = "report-errors";

/// Prefix of every banner message.
pub const BANNER_PREFIX: &str = "Report error: ";

/// Query and mutation primitives the renderers rely on.
pub trait Document {
    /// Does an element with this id exist?
    fn contains(&self, id: &str) -> bool;

    /// Replace the element's content with plain text.
    fn set_text(&mut self, id: &str, text: &str) -> bool;

    /// Replace the element's content with markup, inserted verbatim.
    fn set_html(&mut self, id: &str, html: &str) -> bool;

    /// Replace the content of the first `tag` descendant of the element.
    fn set_descendant_html(&mut self, id: &str, tag: &str, html: &str) -> bool;

    /// Serialized content of the element.
    fn inner_html(&self, id: &str) -> Option<String>;

    /// Remove all content from the element.
    fn clear(&mut self, id: &str) -> bool {
        self.set_html(id, "")
    }

    fn attr(&self, id: &str, name: &str) -> Option<String>;

    fn set_attr(&mut self, id: &str, name: &str, value: &str) -> bool;

    /// Inline style property of the element, if set.
    fn style(&self, id: &str, property: &str) -> Option<String>;

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> bool;

    /// Remove the element itself.
    fn remove(&mut self, id: &str) -> bool;

    /// Remove the closest ancestor-or-self of the element carrying `class`.
    fn remove_closest(&mut self, id: &str, class: &str) -> bool;

    /// Remove every link to `href` inside elements carrying `container_class`.
    /// Returns the number of links removed.
    fn remove_links(&mut self, container_class: &str, href: &str) -> usize;

    /// Rendered width of the element in CSS pixels, 0 when not laid out.
    fn measure_width(&self, id: &str) -> f64;

    /// Rendered width of the element's parent.
    fn measure_parent_width(&self, id: &str) -> f64;

    /// Colour custom properties in effect on the root element.
    fn css_vars(&self) -> IndexMap<String, String>;

    fn root_theme(&self) -> ThemeMode;

    fn set_root_theme(&mut self, mode: ThemeMode);

    /// Show a fixed-position error banner. Banners stack.
    fn show_error(&mut self, message: &str);
}
