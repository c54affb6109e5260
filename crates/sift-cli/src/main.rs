//! Sift CLI - check documents for personal information.

use clap::Parser;
use sift_cli::commands;
use sift_cli::config::OutputFormat;
use sift_cli::{build_provider, init_tracing, Cli, CliError, Command, Config, Formatter};
use sift_extractor::ExtractionService;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let errors = Formatter::new(OutputFormat::Text, !cli.no_color);

    if let Err(e) = run(cli) {
        eprintln!("{}", errors.failure(&e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> sift_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.defaults.format);
    let color_enabled = !cli.no_color && config.defaults.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Config => commands::execute_config(&config),
        Command::Capabilities => {
            let provider = build_provider(&config.model, None, None)?;
            let service = ExtractionService::new(provider, config.catalog()?, config.extractor.clone())?;
            commands::execute_capabilities(&service, &formatter)
        }
        Command::Extract(args) => {
            // The blocking HTTP client must be built and dropped outside the runtime.
            let provider = build_provider(&config.model, args.endpoint.clone(), args.model.clone())?;
            let service = ExtractionService::new(provider, config.catalog()?, config.extractor.clone())?;

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(CliError::Io)?;

            runtime.block_on(commands::execute_extract(args, &service, &config.defaults, &formatter))
        }
    }
}
