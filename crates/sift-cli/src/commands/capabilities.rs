//! Capabilities command implementation.

use crate::error::Result;
use crate::output::Formatter;
use sift_domain::LanguageModel;
use sift_extractor::ExtractionService;
use std::fmt::Display;

/// Execute the capabilities command.
pub fn execute_capabilities<L>(service: &ExtractionService<L>, formatter: &Formatter) -> Result<()>
where
    L: LanguageModel + Send + Sync + 'static,
    L::Error: Display,
{
    println!("{}", formatter.format_capabilities(&service.capabilities())?);
    Ok(())
}
