//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Defaults;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use sift_domain::LanguageModel;
use sift_extractor::{ExtractionRequest, ExtractionService};
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read the document from `path`, or from stdin when no path is given.
pub fn read_document(path: Option<&Path>) -> Result<String> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            CliError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("Document is empty".to_string()));
    }
    Ok(text)
}

/// Build the request from the document and the options, falling back to the
/// configured defaults.
pub fn build_request(text: String, args: &ExtractArgs, defaults: &Defaults) -> Result<ExtractionRequest> {
    let language = args
        .language
        .clone()
        .unwrap_or_else(|| defaults.language.to_string());
    let strategy = args
        .strategy
        .clone()
        .unwrap_or_else(|| defaults.strategy.to_string());

    Ok(ExtractionRequest::parse(text, &language, &strategy)?)
}

/// Run one extraction and render the response.
pub async fn run_extract<L>(
    request: ExtractionRequest,
    service: &ExtractionService<L>,
    formatter: &Formatter,
) -> Result<String>
where
    L: LanguageModel + Send + Sync + 'static,
    L::Error: Display,
{
    debug!(
        language = %request.language,
        strategy = %request.strategy,
        chars = request.text.chars().count(),
        "submitting document"
    );

    let response = service.extract(request).await?;
    formatter.format_response(&response)
}

/// Execute the extract command.
pub async fn execute_extract<L>(
    args: ExtractArgs,
    service: &ExtractionService<L>,
    defaults: &Defaults,
    formatter: &Formatter,
) -> Result<()>
where
    L: LanguageModel + Send + Sync + 'static,
    L::Error: Display,
{
    let text = read_document(args.file.as_deref())?;
    let request = build_request(text, &args, defaults)?;

    println!("{}", run_extract(request, service, formatter).await?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use sift_extractor::{ExtractorConfig, ExtractorError, Language, SchemaCatalog, Strategy};
    use sift_llm::MockProvider;
    use std::io::Write;

    fn args(language: Option<&str>, strategy: Option<&str>) -> ExtractArgs {
        ExtractArgs {
            file: None,
            language: language.map(String::from),
            strategy: strategy.map(String::from),
            endpoint: None,
            model: None,
        }
    }

    #[test]
    fn test_request_uses_defaults() {
        let request = build_request("text".to_string(), &args(None, None), &Defaults::default()).unwrap();
        assert_eq!(request.language, Language::De);
        assert_eq!(request.strategy, Strategy::Advanced);
    }

    #[test]
    fn test_request_options_override_defaults() {
        let request =
            build_request("text".to_string(), &args(Some("EN"), Some("simple")), &Defaults::default()).unwrap();
        assert_eq!(request.language, Language::En);
        assert_eq!(request.strategy, Strategy::Simple);
    }

    #[test]
    fn test_unknown_language_rejected() {
        let result = build_request("text".to_string(), &args(Some("fr"), None), &Defaults::default());
        assert!(matches!(
            result,
            Err(CliError::Extractor(ExtractorError::UnsupportedConfiguration { .. }))
        ));
    }

    #[test]
    fn test_read_document_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Dear Mr. Doe,").unwrap();

        assert_eq!(read_document(Some(file.path())).unwrap(), "Dear Mr. Doe,");
    }

    #[test]
    fn test_read_empty_document_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(read_document(Some(file.path())), Err(CliError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_run_extract_renders_json() {
        let model = MockProvider::scripted(["Yes", "A name.", r#"{"refs": ["Doe"]}"#]);
        let service = ExtractionService::new(model, SchemaCatalog::builtin(), ExtractorConfig::default()).unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);

        let request = ExtractionRequest::new("Dear Mr. Doe,", Language::En, Strategy::Advanced);
        let output = run_extract(request, &service, &formatter).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["result"]["details"]["refs"][0], "Doe");
        assert_eq!(value["metadata"]["model_calls"], 3);
    }

    #[tokio::test]
    async fn test_run_extract_surfaces_stage() {
        let model = MockProvider::scripted(["Yes"]);
        model.push_error("overloaded");
        let service = ExtractionService::new(model, SchemaCatalog::builtin(), ExtractorConfig::default()).unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);

        let request = ExtractionRequest::new("Dear Mr. Doe,", Language::En, Strategy::Advanced);
        let error = run_extract(request, &service, &formatter).await.unwrap_err();

        assert_eq!(error.stage(), Some("elaboration"));
    }
}
