//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use colored::*;
use sift_extractor::{Capabilities, ExtractionMetadata, ExtractionResponse, ExtractionResult};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an extraction response.
    pub fn format_response(&self, response: &ExtractionResponse) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
            OutputFormat::Text => self.format_response_text(response),
        }
    }

    /// Format the service capabilities.
    pub fn format_capabilities(&self, capabilities: &Capabilities) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(capabilities)?),
            OutputFormat::Text => {
                let join = |items: Vec<String>| items.join(", ");
                Ok([
                    format!(
                        "{} {}",
                        self.colorize(&capabilities.annotator_name, "cyan"),
                        capabilities.version
                    ),
                    format!(
                        "Languages:    {}",
                        join(capabilities.supported_languages.iter().map(|l| l.to_string()).collect())
                    ),
                    format!(
                        "Strategies:   {}",
                        join(capabilities.supported_strategies.iter().map(|s| s.to_string()).collect())
                    ),
                    format!("Reproducible: {}", capabilities.reproducible),
                ]
                .join("\n"))
            }
        }
    }

    fn format_response_text(&self, response: &ExtractionResponse) -> Result<String> {
        let mut lines = Vec::new();

        match &response.result {
            ExtractionResult::Simple(result) => {
                lines.push(result.description.clone());
            }
            ExtractionResult::Advanced(result) => {
                if result.contains_target {
                    lines.push(self.warning("Personal information found"));
                    lines.push(String::new());
                    lines.push(result.description.clone());
                    if !result.details.is_empty() {
                        lines.push(String::new());
                        lines.push(self.colorize("Details:", "cyan"));
                        lines.push(serde_json::to_string_pretty(&result.details)?);
                    }
                } else {
                    lines.push(self.success("No personal information found"));
                    lines.push(self.colorize(&format!("Model answered: {}", result.description), "blue"));
                }
            }
        }

        lines.push(String::new());
        lines.push(self.metadata_line(&response.metadata));
        Ok(lines.join("\n"))
    }

    fn metadata_line(&self, metadata: &ExtractionMetadata) -> String {
        let line = format!(
            "request {} | {} | {}/{} | {} call(s) | {} ms",
            metadata.request_id,
            metadata.model,
            metadata.language,
            metadata.strategy,
            metadata.model_calls,
            metadata.processing_time_ms
        );
        if self.color_enabled {
            line.dimmed().to_string()
        } else {
            line
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a failed command, naming the protocol stage when there is one.
    pub fn failure(&self, error: &CliError) -> String {
        match error.stage() {
            Some(stage) => self.error(&format!("Error during {}: {}", stage, error)),
            None => self.error(&format!("Error: {}", error)),
        }
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
