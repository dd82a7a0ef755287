use std::process::ExitCode;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use validate_books::error::{CatalogError, Result};
use validate_books::{
    Cli, Config, ConfigManager, ErrorReporter, FailurePolicy, Output, Projection, VerbosityLevel,
    load_records, validate_all, validate_all_parallel,
};

const EXIT_INVALID_RECORDS: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let config = match ConfigManager::load_config(&cli).await {
        Ok(config) => config,
        Err(error) => {
            init_tracing(cli.verbosity());
            ErrorReporter::new(cli.verbosity()).report_catalog_error(&CatalogError::from(error));
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    init_tracing(config.verbosity());
    debug!(?config, "configuration loaded");

    match run(&config).await {
        Ok(code) => code,
        Err(error) => {
            ErrorReporter::new(config.verbosity()).report_catalog_error(&error);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(config: &Config) -> Result<ExitCode> {
    let records = load_records(&config.input.path).await?;
    info!(
        path = %config.input.path.display(),
        records = records.len(),
        parallel = config.validation.parallel,
        "validating catalog"
    );

    let policy = config.failure_policy();
    let results = if config.validation.parallel {
        validate_all_parallel(&records, policy)
    } else {
        validate_all(&records, policy)
    };

    let output = Output::new(
        config.verbosity(),
        config.output.format.into(),
        Projection::from_config(&config.output),
    );
    print!("{}", output.format_results(&results)?);

    if !results.has_errors() {
        return Ok(ExitCode::SUCCESS);
    }

    if policy == FailurePolicy::FailFast
        && let Some(first_error) = results.errors().next()
    {
        ErrorReporter::new(config.verbosity()).report_record_error(first_error);
    }

    Ok(ExitCode::from(EXIT_INVALID_RECORDS))
}

/// `RUST_LOG` wins; otherwise the level follows the configured verbosity.
fn init_tracing(verbosity: VerbosityLevel) {
    let default_level = match verbosity {
        VerbosityLevel::Quiet => "error",
        VerbosityLevel::Normal => "warn",
        VerbosityLevel::Verbose => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
