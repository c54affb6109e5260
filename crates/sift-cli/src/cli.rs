//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sift - find personal information in documents with a language model.
#[derive(Debug, Parser)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// JSON format
    Json,
    /// Text format
    Text,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a document for personal information
    Extract(ExtractArgs),

    /// Show supported languages and strategies
    Capabilities,

    /// Print the effective configuration
    Config,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document to read; stdin when omitted
    pub file: Option<PathBuf>,

    /// Prompt language (en, de)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Conversation strategy (simple, advanced)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Override the model server endpoint
    #[arg(long, env = "SIFT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Override the model name
    #[arg(short, long)]
    pub model: Option<String>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Text => crate::config::OutputFormat::Text,
        }
    }
}
