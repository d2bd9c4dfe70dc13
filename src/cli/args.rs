//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    boxes::BoxesArgs, completions::CompletionsArgs, config::ConfigCommands, list::ListArgs,
    register::RegisterArgs, remove::RemoveArgs, report::ReportArgs,
};

#[derive(Parser)]
#[command(name = "qcp")]
#[command(author, version, about = "Part quality control and packing")]
#[command(long_about = "Part quality control and packing. Classify inspected parts against quality limits, pack approved parts into fixed-capacity boxes and keep everything as plain JSON files. Run without a command for the interactive menu.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Data directory (default: ./data, or QCP_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive menu (the default when no command is given)
    Menu,

    /// Register and classify a new part
    Register(RegisterArgs),

    /// List approved and rejected parts
    List(ListArgs),

    /// Remove a part that is not sealed in a closed box
    Remove(RemoveArgs),

    /// List closed boxes
    Boxes(BoxesArgs),

    /// Generate the summary report
    Report(ReportArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and messages
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
