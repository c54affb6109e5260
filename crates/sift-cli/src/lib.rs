//! Sift CLI library.
//!
//! This library provides the core functionality for the `sift` command-line
//! interface, including configuration management, command execution, logging
//! setup and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;

use sift_llm::{LlamaCppConfig, LlamaCppProvider};
use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr.
///
/// `RUST_LOG` is honoured unless `verbose` forces debug output.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Connect the configured llama.cpp backend, applying command-line overrides.
pub fn build_provider(
    config: &LlamaCppConfig,
    endpoint: Option<String>,
    model: Option<String>,
) -> Result<LlamaCppProvider> {
    let mut config = config.clone();
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if let Some(model) = model {
        config.model = model;
    }
    Ok(LlamaCppProvider::from_config(&config)?)
}
