//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "dbviewer")]
#[command(
    author,
    version,
    about = "Visualize the database schema and query functions embedded in source code"
)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Where the schema and functions files come from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Schema definition file (auto-detected when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Query functions file (auto-detected when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub functions: Option<PathBuf>,

    /// Directory to auto-detect files in
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Configuration file (defaults to the nearest dbviewer.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Display the recovered schema
    Schema {
        /// Schema definition file (same as --schema)
        file: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Display functions and the queries they issue
    Functions {
        /// Query functions file (same as --functions)
        file: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Display foreign key relationships between tables
    Relationships {
        /// Schema definition file (same as --schema)
        file: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Display which files are in use and what they contain
    Info {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show which schema and functions files would be picked up
    Detect {
        /// Directory to search
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output format
        #[arg(long, default_value = "human", value_enum)]
        format: OutputFormat,
    },

    /// List SQL fragments found in a file (for debugging)
    Fragments {
        /// Source file to scan
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "human", value_enum)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON documents as served to the web viewer
    Json,
}
