//! Render command implementation.
//!
//! Loads a run payload, drives the boot sequence against a static page and
//! writes the result into the artifact directory.

use super::resolve_config;
use crate::artifact::{ArtifactWriter, WrittenArtifacts};
use crate::charts::{AssetSource, StaticEmbed};
use crate::cli::RenderArgs;
use crate::config::{CliOverrides, ReportConfig};
use crate::document::html::render_page;
use crate::document::{Document, PageOptions, StaticDocument, report_page};
use crate::error::{ReportError, Result};
use crate::loader::{
    ContextLoader, EmbeddedElement, FileFetcher, InlineSource, InlineText, RUN_DATA_ID,
};
use crate::output::OutputContext;
use crate::report::{BootSummary, Orchestrator};
use crate::theme::{FileThemeStore, ThemeMode, ThemeStore};
use crate::util::ThreadPause;
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const STDIN_ARG: &str = "-";

#[derive(Debug, Serialize)]
struct RenderOutput<'a> {
    input: &'a str,
    #[serde(flatten)]
    artifacts: &'a WrittenArtifacts,
    #[serde(skip_serializing_if = "Option::is_none")]
    toggled_to: Option<ThemeMode>,
    boot: &'a BootSummary,
}

/// The input, resolved into a payload source and the directory its
/// fallback `run.json` is read from.
struct Input {
    source: Box<dyn InlineSource>,
    fallback_dir: PathBuf,
    key: String,
}

/// Payload bytes as text. Invalid UTF-8 is replaced rather than rejected so
/// the loader can still fall back to `run.json`.
fn decode_payload(bytes: Vec<u8>, name: &str) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        warn!(input = name, error = %e.utf8_error(), "input is not valid UTF-8");
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    })
}

fn open_input(raw: &str) -> Result<Input> {
    if raw == STDIN_ARG {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        return Ok(Input {
            source: Box::new(InlineText::new(decode_payload(bytes, "stdin"), "stdin")),
            fallback_dir: std::env::current_dir()?,
            key: "stdin".to_string(),
        });
    }

    let path = Path::new(raw);
    if !path.is_file() {
        return Err(ReportError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let fallback_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));

    let source: Box<dyn InlineSource> = if is_html {
        Box::new(EmbeddedElement::from_file(path)?)
    } else {
        let name = path.display().to_string();
        let text = decode_payload(std::fs::read(path)?, &name);
        Box::new(InlineText::new(text, name))
    };
    Ok(Input {
        source,
        fallback_dir,
        key: raw.to_string(),
    })
}

/// Page `<script>` sources and the local files to copy next to the report.
fn plan_assets(config: &ReportConfig, copy: bool) -> (Vec<String>, Option<String>, Vec<PathBuf>) {
    let mut to_copy = Vec::new();
    let scripts = config
        .assets
        .entries()
        .iter()
        .map(|(_, source)| {
            if let (true, AssetSource::File(path)) = (copy, source) {
                to_copy.push(path.clone());
            }
            source.script_src(copy)
        })
        .collect();

    let stylesheet = config.stylesheet.as_ref().map(|path| {
        let css = AssetSource::File(path.clone());
        if copy {
            to_copy.push(path.clone());
        }
        css.script_src(copy)
    });
    (scripts, stylesheet, to_copy)
}

/// Execute the render command.
///
/// # Errors
///
/// Returns an error if the input is missing, config is invalid, or the
/// report cannot be written. Problems inside the page are reported as
/// banners and in the summary, not as errors.
pub fn execute(args: &RenderArgs, state_dir: Option<&Path>, ctx: &OutputContext) -> Result<()> {
    let overrides = CliOverrides {
        artifact_root: args.artifact_root.clone(),
        slug_mode: args.slug_mode.clone(),
        title: args.title.clone(),
        state_dir: state_dir.map(Path::to_path_buf),
    };
    let config = resolve_config(&overrides)?;
    let input = open_input(&args.input)?;
    info!(input = %args.input, "rendering report");

    let copy = config.copy_assets && !args.no_assets;
    let (scripts, stylesheet, to_copy) = plan_assets(&config, copy);
    let page = report_page(&PageOptions {
        title: config.title.clone(),
        theme: ThemeMode::default(),
        palettes: config.palettes.clone(),
        scripts,
        stylesheet,
    });
    let mut doc = StaticDocument::new(page, config.layout, config.palettes.clone());

    let fetcher = FileFetcher::new(&input.fallback_dir);
    let loader = ContextLoader::new(input.source.as_ref(), &fetcher);
    let mut store = FileThemeStore::new(&config.state_dir);
    let pause = ThreadPause;
    let mut orchestrator = Orchestrator::new(
        &config.assets,
        &StaticEmbed,
        &pause,
        config.mount,
        config.runtime,
    )
    .with_theme(args.theme.map(ThemeMode::from));

    let mut boot = orchestrator.boot(&mut doc, &loader, &store);
    let toggled_to = if args.toggle_theme {
        let next = orchestrator.toggle_theme(&mut doc, &mut store)?;
        boot.theme = next;
        Some(next)
    } else {
        None
    };

    let payload = orchestrator.context().payload.clone();
    doc.set_text(RUN_DATA_ID, &serde_json::to_string(&payload)?);

    let writer = ArtifactWriter::new(&config.artifact_root, config.slug_mode, config.slug_length);
    let dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| writer.dir_for(&input.key));
    let written = writer.write(&dir, &render_page(doc.root()), &payload, &to_copy)?;

    if ctx.is_json() {
        return ctx.json_pretty(&RenderOutput {
            input: &args.input,
            artifacts: &written,
            toggled_to,
            boot: &boot,
        });
    }

    for message in &boot.errors {
        ctx.warning(message);
    }
    for path in &written.missing_assets {
        ctx.warning(&format!("asset not copied: {}", path.display()));
    }
    if let Some(mode) = toggled_to {
        ctx.print(&format!("Theme set to {mode}"));
    }
    ctx.success(&format!("Wrote {}", written.report.display()));
    Ok(())
}
