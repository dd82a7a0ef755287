//! # validate-books Library
//!
//! Validates book records read from a JSON catalog. Each raw record becomes an
//! immutable [`Book`] or a structured [`BookError`] explaining what to fix,
//! including an ISBN-10 checksum check.

pub mod book;
pub mod cli;
pub mod config;
pub mod error;
pub mod error_reporter;
pub mod loader;
pub mod output;
pub mod validator;

pub use book::{Book, BookField, RawRecord};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager, EnvProvider, OutputFormatConfig};
pub use error::{BookError, BookErrorKind, BookResult, CatalogError, RecordError};
pub use error_reporter::ErrorReporter;
pub use loader::{load_records, parse_records};
pub use output::{Output, Projection};
pub use validator::{
    FailurePolicy, RecordOutcome, ValidationResults, check_identifier_presence, validate,
    validate_all, validate_all_parallel, validate_isbn10,
};
