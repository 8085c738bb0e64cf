//! HTML serialization, page stylesheet and the in-page bootstrap script.

use super::dom::{Element, Node};
use crate::theme::{Palettes, ThemeMode, ThemeTokens};

const VOID_ELEMENTS: [&str; 6] = ["meta", "link", "br", "hr", "img", "input"];

/// Serialize a whole page, doctype included.
#[must_use]
pub fn render_page(root: &Element) -> String {
    let mut out = String::from("<!doctype html>\n");
    write_element(root, &mut out);
    out.push('\n');
    out
}

/// Serialize the children of an element.
#[must_use]
pub fn inner_html(el: &Element) -> String {
    let mut out = String::new();
    write_children(el, &mut out);
    out
}

/// Concatenated text of an element and its descendants.
#[must_use]
pub fn text_content(el: &Element) -> String {
    let mut out = String::new();
    for node in &el.children {
        match node {
            Node::Element(child) => out.push_str(&text_content(child)),
            Node::Text(text) | Node::Raw(text) => out.push_str(text),
        }
    }
    out
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }
    write_children(el, out);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn write_children(el: &Element, out: &mut String) {
    let raw_text = matches!(el.tag.as_str(), "script" | "style");
    for node in &el.children {
        match node {
            Node::Element(child) => write_element(child, out),
            Node::Text(text) if raw_text => out.push_str(&escape_script(text)),
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Raw(markup) => out.push_str(markup),
        }
    }
}

#[must_use]
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[must_use]
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Script and style bodies are not entity-decoded, so only a closing tag
/// sequence needs breaking up.
#[must_use]
pub fn escape_script(text: &str) -> String {
    text.replace("</", "<\\/")
}

fn palette_block(selector: &str, tokens: &ThemeTokens, page: &PageColors) -> String {
    let mut block = format!("{selector}{{");
    for (name, value) in tokens.css_vars() {
        block.push_str(&format!("{name}:{value};"));
    }
    block.push_str(&format!(
        "--bg:{};--panel:{};color-scheme:{};}}\n",
        page.background, page.panel, page.scheme
    ));
    block
}

struct PageColors {
    background: &'static str,
    panel: &'static str,
    scheme: &'static str,
}

const fn page_colors(mode: ThemeMode) -> PageColors {
    match mode {
        ThemeMode::Dark => PageColors {
            background: "#0b1220",
            panel: "#111a2b",
            scheme: "dark",
        },
        ThemeMode::Light => PageColors {
            background: "#f6f8fb",
            panel: "#ffffff",
            scheme: "light",
        },
    }
}

/// Page stylesheet with the custom properties of both palettes.
#[must_use]
pub fn stylesheet(palettes: &Palettes) -> String {
    let mut css = String::new();
    css.push_str(&palette_block(
        ":root,:root[data-theme=\"dark\"]",
        palettes.get(ThemeMode::Dark),
        &page_colors(ThemeMode::Dark),
    ));
    css.push_str(&palette_block(
        ":root[data-theme=\"light\"]",
        palettes.get(ThemeMode::Light),
        &page_colors(ThemeMode::Light),
    ));
    css.push_str(BASE_CSS);
    css
}

const BASE_CSS: &str = r#"*{box-sizing:border-box}
body{margin:0;background:var(--bg);color:var(--text);font:14px/1.5 system-ui,-apple-system,"Segoe UI",sans-serif}
.topbar{display:flex;align-items:center;gap:12px;padding:16px 24px;border-bottom:1px solid var(--border)}
.topbar h1{font-size:18px;margin:0;flex:1}
.topbar a,.topbar button{color:var(--accent);background:none;border:1px solid var(--border);border-radius:8px;padding:6px 10px;font:inherit;cursor:pointer;text-decoration:none}
.toc{display:flex;gap:16px;padding:8px 24px;border-bottom:1px solid var(--border)}
.toc a{color:var(--muted);text-decoration:none}
.toc a:hover{color:var(--accent)}
main{max-width:1280px;margin:0 auto;padding:0 24px 48px}
.panel h2{font-size:15px;color:var(--muted);text-transform:uppercase;letter-spacing:.04em;margin:28px 0 12px}
.kpi-grid,.compare-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(170px,1fr));gap:12px}
.kpi,.kpi-compare{background:var(--panel);border:1px solid var(--border);border-radius:10px;padding:12px 14px}
.kpi-label,.kpi-compare__label{color:var(--muted);font-size:12px}
.kpi-value{font-size:20px;font-weight:600;overflow-wrap:anywhere}
.kpi-compare__vals{display:flex;flex-wrap:wrap;align-items:baseline;gap:4px}
.kpi-compare__sep,.kpi-compare__before{color:var(--muted)}
.delta{margin-left:6px;font-size:12px;font-weight:600}
.delta.up{color:#22c55e}.delta.down{color:#ef4444}.delta.flat{color:var(--muted)}
.grid{display:grid;grid-template-columns:1fr 1fr;gap:16px;margin-top:16px}
.chart-card{background:var(--panel);border:1px solid var(--border);border-radius:10px;padding:14px}
.chart-card.wide{grid-column:1 / -1}
.chart-card h3{font-size:13px;margin:0 0 8px;color:var(--muted);font-weight:500}
table{width:100%;border-collapse:collapse;background:var(--panel);border:1px solid var(--border);border-radius:10px;margin-bottom:16px}
th,td{padding:6px 10px;border-bottom:1px solid var(--border);text-align:left}
th{color:var(--muted);font-weight:500;font-size:12px}
td.num,th.num{text-align:right;font-variant-numeric:tabular-nums}
td.muted{color:var(--muted)}
.error-stack{position:fixed;bottom:10px;left:10px;display:flex;flex-direction:column;gap:6px;z-index:9999}
.report-error{background:#c62828;color:#fff;padding:8px 12px;border-radius:8px;font:12px/1.4 system-ui}
"#;

/// Runs in the browser: embeds every pre-built chart spec and repaints on
/// theme toggle using the pre-built theme configs.
pub const BOOTSTRAP_JS: &str = r#"(function(){
  var root = document.documentElement;
  var stored = null;
  try { stored = localStorage.getItem('ts-theme'); } catch (e) {}
  if (stored === 'light' || stored === 'dark') root.setAttribute('data-theme', stored);

  function banner(msg){
    var stack = document.getElementById('report-errors');
    if (!stack) { stack = document.createElement('div'); stack.id = 'report-errors'; stack.className = 'error-stack'; document.body.appendChild(stack); }
    var div = document.createElement('div');
    div.className = 'report-error';
    div.textContent = 'Report error: ' + msg;
    stack.appendChild(div);
    console.error('[report] ' + msg);
  }
  function themes(){
    var el = document.getElementById('chart-themes');
    try { return el ? JSON.parse(el.textContent) : {}; } catch (e) { return {}; }
  }
  function ready(){
    if (!window.vegaLite && window.vl) window.vegaLite = window.vl;
    return !!(window.vegaEmbed && window.vega && window.vegaLite);
  }
  function draw(){
    var mode = root.getAttribute('data-theme') === 'light' ? 'light' : 'dark';
    var theme = themes()[mode] || {};
    document.querySelectorAll('script.vega-spec').forEach(function(node){
      var host = node.parentElement;
      var spec;
      try { spec = JSON.parse(node.textContent); } catch (e) { banner('bad chart spec: ' + e); return; }
      spec.config = Object.assign({}, spec.config || {}, theme);
      var old = host.querySelector('.vega-embed');
      if (old) old.remove();
      var target = document.createElement('div');
      host.appendChild(target);
      window.vegaEmbed(target, spec, { actions: false, renderer: 'canvas' })
        .then(function(res){ try { res.view.resize(); } catch (e) {} })
        .catch(function(e){ banner('vegaEmbed failed: ' + ((e && e.message) || e)); });
    });
  }
  var toggle = document.getElementById('toggle-theme');
  if (toggle) toggle.addEventListener('click', function(){
    var next = root.getAttribute('data-theme') === 'light' ? 'dark' : 'light';
    root.setAttribute('data-theme', next);
    try { localStorage.setItem('ts-theme', next); } catch (e) {}
    if (ready()) draw();
  });
  var tries = 0;
  (function wait(){
    if (ready()) { draw(); return; }
    if (++tries >= 40) { banner('Vega libraries not loaded — charts skipped'); return; }
    setTimeout(wait, 100);
  })();
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_and_empty_attributes() {
        let el = Element::new("div")
            .attr("hidden", "")
            .child(Element::new("meta").attr("charset", "utf-8"));
        let mut out = String::new();
        write_element(&el, &mut out);
        assert_eq!(out, r#"<div hidden><meta charset="utf-8"></div>"#);
    }

    #[test]
    fn attributes_are_escaped() {
        let el = Element::new("a").attr("title", r#"5 "ms" & more"#);
        let mut out = String::new();
        write_element(&el, &mut out);
        assert_eq!(out, r#"<a title="5 &quot;ms&quot; &amp; more"></a>"#);
    }

    #[test]
    fn script_text_breaks_closing_tags() {
        let el = Element::new("script").text(r#"{"a":"</script>"}"#);
        assert_eq!(inner_html(&el), r#"{"a":"<\/script>"}"#);
    }

    #[test]
    fn stylesheet_carries_both_palettes() {
        let css = stylesheet(&Palettes::default());
        assert!(css.contains(":root[data-theme=\"light\"]{--text:#1b2330;"));
        assert!(css.contains("--accent-2:#9b8cff;"));
        assert!(css.contains(".error-stack{position:fixed"));
    }
}
