//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;

/// Static HTML performance reports from benchmark run JSON
#[derive(Parser, Debug)]
#[command(name = "runreport", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Theme preference directory (default: ~/.config/runreport)
    #[arg(long, global = true, env = "RUNREPORT_STATE_DIR", value_name = "DIR")]
    pub state_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a run payload into an HTML report
    Render(RenderArgs),

    /// Show or change the persisted theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Run JSON, an existing report HTML, or '-' for stdin
    pub input: String,

    /// Write into this directory instead of <artifact-root>/<slug>
    #[arg(long, short = 'o', value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Root directory for report artifacts
    #[arg(long, value_name = "DIR")]
    pub artifact_root: Option<PathBuf>,

    /// How the per-run directory is named (hashprefix, basename, keypath)
    #[arg(long, value_name = "MODE")]
    pub slug_mode: Option<String>,

    /// Page title
    #[arg(long)]
    pub title: Option<String>,

    /// Render with this theme instead of the stored preference
    #[arg(long, value_enum)]
    pub theme: Option<ThemeArg>,

    /// Flip and persist the theme after rendering, then redraw
    #[arg(long)]
    pub toggle_theme: bool,

    /// Reference asset files in place instead of copying them
    #[arg(long)]
    pub no_assets: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeCommands {
    /// Print the stored preference
    Show,
    /// Store a preference
    Set {
        #[arg(value_enum)]
        mode: ThemeArg,
    },
    /// Flip the stored preference
    Toggle,
}

#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for crate::theme::ThemeMode {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}
