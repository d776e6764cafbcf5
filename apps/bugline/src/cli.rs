//! Command line interface definition

use bugline_types::{ColorChoice, Severity};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// bugline - submit bug reports with attachments
#[derive(Parser)]
#[command(name = "bugline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Submit bug reports with attachments to a report service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to the bugline log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a bug report and upload its attachments
    #[command(alias = "s")]
    Submit(SubmitArgs),

    /// Show the effective configuration (report token redacted)
    Config,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Report text
    #[arg(long, short = 'm', conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read the report text from a file
    #[arg(long, value_name = "PATH")]
    pub content_file: Option<PathBuf>,

    /// Extra line appended to the text, e.g. a build version (repeatable)
    #[arg(long, value_name = "TEXT")]
    pub append: Vec<String>,

    /// Severity: critical, high, low or none
    #[arg(long, short, value_enum)]
    pub severity: Option<Severity>,

    /// Contact email of the reporter
    #[arg(long, short)]
    pub email: Option<String>,

    /// File to attach (repeatable)
    #[arg(long, short, value_name = "PATH")]
    pub attach: Vec<PathBuf>,

    /// Report token, overrides config and BUGLINE_REPORT_TOKEN
    #[arg(long)]
    pub token: Option<String>,

    /// Base URL of the report service
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}
