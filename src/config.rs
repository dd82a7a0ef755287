use crate::book::BookField;
use crate::cli::{Cli, OutputFormat, VerbosityLevel};
use crate::validator::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input file used when neither the CLI, the environment nor a config file names one
pub const DEFAULT_INPUT_PATH: &str = "data.json";

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub validation: ValidationConfig,
    pub output: OutputConfig,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Catalog file to validate
    pub path: PathBuf,
}

/// Validation-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Stop validation on first invalid record
    pub fail_fast: bool,
    /// Validate records on the rayon pool
    pub parallel: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (failures only)
    pub quiet: bool,
    /// Fields shown for each book; empty means all
    pub include_fields: Vec<String>,
    /// Fields hidden for each book
    pub exclude_fields: Vec<String>,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Summary => OutputFormat::Summary,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_INPUT_PATH),
        }
    }
}

impl Config {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.output.quiet {
            VerbosityLevel::Quiet
        } else if self.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::from_fail_fast(self.validation.fail_fast)
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(cli, &SystemEnvProvider).await
    }

    /// Load configuration reading environment overrides from `env`
    pub async fn load_config_with(cli: &Cli, env: &impl EnvProvider) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path).await?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = Self::merge_configs(config, found_config);
        }

        config = Self::apply_environment_overrides_with(env, config)?;

        // CLI arguments have the highest precedence
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "validate-books.toml",
            "validate-books.json",
            ".validate-books.toml",
            ".validate-books.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("validate-books");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(input) = env.get("VALIDATE_BOOKS_INPUT") {
            config.input.path = PathBuf::from(input);
        }

        if let Some(fail_fast) = env.get("VALIDATE_BOOKS_FAIL_FAST") {
            config.validation.fail_fast = parse_bool("VALIDATE_BOOKS_FAIL_FAST", &fail_fast)?;
        }

        if let Some(parallel) = env.get("VALIDATE_BOOKS_PARALLEL") {
            config.validation.parallel = parse_bool("VALIDATE_BOOKS_PARALLEL", &parallel)?;
        }

        if let Some(verbose) = env.get("VALIDATE_BOOKS_VERBOSE") {
            config.output.verbose = parse_bool("VALIDATE_BOOKS_VERBOSE", &verbose)?;
        }

        if let Some(quiet) = env.get("VALIDATE_BOOKS_QUIET") {
            config.output.quiet = parse_bool("VALIDATE_BOOKS_QUIET", &quiet)?;
        }

        if let Some(format) = env.get("VALIDATE_BOOKS_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid VALIDATE_BOOKS_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        if let Some(include) = env.get("VALIDATE_BOOKS_INCLUDE") {
            config.output.include_fields = split_list(&include);
        }

        if let Some(exclude) = env.get("VALIDATE_BOOKS_EXCLUDE") {
            config.output.exclude_fields = split_list(&exclude);
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(path) = &cli.path {
            config.input.path = path.clone();
        }

        if cli.fail_fast {
            config.validation.fail_fast = true;
        }
        if cli.parallel {
            config.validation.parallel = true;
        }

        if let Some(format) = cli.output_format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        // A projection given on the command line replaces the configured one entirely
        if !cli.include_fields.is_empty() {
            config.output.include_fields = cli.include_fields.clone();
            config.output.exclude_fields.clear();
        }
        if !cli.exclude_fields.is_empty() {
            config.output.exclude_fields = cli.exclude_fields.clone();
            config.output.include_fields.clear();
        }

        config
    }

    /// Merge two configurations (second takes precedence)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        base.input.path = override_config.input.path;

        base.validation.fail_fast = override_config.validation.fail_fast;
        base.validation.parallel = override_config.validation.parallel;

        base.output.format = override_config.output.format;
        base.output.verbose = override_config.output.verbose;
        base.output.quiet = override_config.output.quiet;
        if !override_config.output.include_fields.is_empty() {
            base.output.include_fields = override_config.output.include_fields;
        }
        if !override_config.output.exclude_fields.is_empty() {
            base.output.exclude_fields = override_config.output.exclude_fields;
        }

        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.input.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "Input path must not be empty".to_string(),
            ));
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        if !config.output.include_fields.is_empty() && !config.output.exclude_fields.is_empty() {
            return Err(ConfigError::Validation(
                "Cannot set both include_fields and exclude_fields".to_string(),
            ));
        }

        // Typos in a projection would silently drop columns, so reject them here.
        for name in config
            .output
            .include_fields
            .iter()
            .chain(&config.output.exclude_fields)
        {
            if BookField::from_name(name).is_none() {
                return Err(ConfigError::Validation(format!(
                    "Unknown book field: {} (expected one of: {})",
                    name,
                    BookField::ALL.map(|field| field.name()).join(", ")
                )));
            }
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
