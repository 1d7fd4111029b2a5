//! dbviewer CLI - schema and query function viewer

mod args;
mod config;
mod context;
mod detect;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command, SourceArgs};
use crate::context::Context;
use crate::detect::detect_db_files;
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let output = match args.command {
        Command::Schema { file, source } => {
            let ctx = Context::load(&with_schema(source, file))?;
            OutputFormatter::new(ctx.format).schema(ctx.schema()?)?
        }

        Command::Functions { file, source } => {
            let source = SourceArgs {
                functions: file.or(source.functions),
                ..source
            };
            let ctx = Context::load(&source)?;
            OutputFormatter::new(ctx.format).functions(ctx.functions()?)?
        }

        Command::Relationships { file, source } => {
            let ctx = Context::load(&with_schema(source, file))?;
            OutputFormatter::new(ctx.format).relationships(&ctx.relationships()?)?
        }

        Command::Info { source } => {
            let ctx = Context::load(&source)?;
            OutputFormatter::new(ctx.format).info(&ctx.info())?
        }

        Command::Detect { dir, format } => {
            let detected = detect_db_files(&dir)?;
            OutputFormatter::new(format).detected(&detected)?
        }

        Command::Fragments { file, format } => {
            let content = read_file(&file)?;
            let fragments = dbviewer_core::extract_fragments(&content);
            tracing::info!(fragments = fragments.len(), "scanned {}", file.display());
            OutputFormatter::new(format).fragments(&fragments)?
        }
    };

    println!("{}", output);
    Ok(())
}

/// A positional FILE takes the place of `--schema`
fn with_schema(source: SourceArgs, file: Option<std::path::PathBuf>) -> SourceArgs {
    SourceArgs {
        schema: file.or(source.schema),
        ..source
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}
