use crate::cli::VerbosityLevel;
use crate::error::{BookError, CatalogError, RecordError};

/// Error reporter with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_timestamps: bool,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_timestamps: false,
        }
    }

    /// Create a new error reporter with additional options
    pub fn with_options(verbosity: VerbosityLevel, show_timestamps: bool) -> Self {
        Self {
            verbosity,
            show_timestamps,
        }
    }

    /// Report the record that stopped a fail-fast run
    pub fn report_record_error(&self, error: &RecordError) {
        eprintln!("{}", self.format_record_error(error));
    }

    /// Report an error that prevented validation from running
    pub fn report_catalog_error(&self, error: &CatalogError) {
        eprintln!("{}", self.format_catalog_error(error));
    }

    pub fn format_record_error(&self, error: &RecordError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("INVALID: record {}", error.index),
            VerbosityLevel::Normal => {
                format!("{}Stopped at invalid record: {}", self.timestamp(), error)
            }
            VerbosityLevel::Verbose => {
                let mut output =
                    format!("{}Stopped at invalid record: {}", self.timestamp(), error);
                output.push_str(&format!("\nKind: {}", error.kind()));
                output.push_str(&format!("\nSuggestion: {}", suggestion(&error.source)));
                output
            }
        }
    }

    pub fn format_catalog_error(&self, error: &CatalogError) -> String {
        if self.verbosity == VerbosityLevel::Quiet {
            return format!("ERROR: {}", error);
        }

        let mut output = format!("{}{}", self.timestamp(), error);

        match error {
            CatalogError::Io(_) => {
                output.push_str("\nSuggestion: Check that the catalog file exists and is readable");
            }
            CatalogError::Json(_) => {
                output.push_str("\nSuggestion: Check the catalog file is valid UTF-8 JSON");
            }
            CatalogError::InvalidInput { .. } => {
                output.push_str(
                    "\nSuggestion: The catalog must be a JSON array of objects, one per book",
                );
            }
            CatalogError::Config(_) => {
                output.push_str(
                    "\nSuggestion: Check the configuration file, VALIDATE_BOOKS_* variables and flags",
                );
            }
        }

        if self.verbosity == VerbosityLevel::Verbose {
            output.push_str("\nError Chain:");
            let mut current_error: &dyn std::error::Error = error;
            let mut level = 0;
            while let Some(source) = current_error.source() {
                output.push_str(&format!("\n  {}: {}", level + 1, source));
                current_error = source;
                level += 1;
            }
        }

        output
    }

    fn timestamp(&self) -> String {
        if self.show_timestamps {
            format!("[{}] ", chrono::Utc::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// How to fix a record that failed with `error`
pub fn suggestion(error: &BookError) -> String {
    match error {
        BookError::MissingIdentifier { .. } => {
            "Add an isbn_10 or isbn_13 field to the record".to_string()
        }
        BookError::InvalidIsbn10Format { value, .. } => format!(
            "Check {:?} against the printed ISBN; only digits and a final X count towards the 10 characters",
            value
        ),
        BookError::Schema { field, .. } => {
            format!("Fix the '{}' field of the record", field)
        }
    }
}
