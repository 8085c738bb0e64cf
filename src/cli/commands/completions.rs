//! `runreport completions <shell>`: print or write a completion script.

use crate::cli::{Cli, CompletionsArgs};
use crate::error::{ReportError, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

const BIN_NAME: &str = "runreport";

fn write_script(shell: Shell, out: &mut dyn Write) {
    generate(shell, &mut Cli::command(), BIN_NAME, out);
}

/// Execute the completions command.
///
/// # Errors
///
/// Returns an error if the output file cannot be written.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    let Some(path) = &args.output else {
        write_script(args.shell, &mut io::stdout().lock());
        return Ok(());
    };

    let file = File::create(path)
        .map_err(|e| ReportError::with_context(format!("create {}", path.display()), e))?;
    let mut out = BufWriter::new(file);
    write_script(args.shell, &mut out);
    out.flush()?;
    info!(shell = %args.shell, path = %path.display(), "completion script written");
    eprintln!("Generated {} completions to {}", args.shell, path.display());
    Ok(())
}
