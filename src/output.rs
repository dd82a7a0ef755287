//! Output and Reporting
//!
//! This module renders validation results as a human report, a JSON document
//! or a bare summary, applying the configured field projection to each book.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::book::Book;
use crate::cli::{OutputFormat, VerbosityLevel};
use crate::config::OutputConfig;
use crate::error::{BookError, BookErrorKind, RecordError, Result};
use crate::validator::{RecordOutcome, ValidationResults};

/// Which fields of each book are rendered
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Projection {
    pub fn from_config(config: &OutputConfig) -> Self {
        if !config.include_fields.is_empty() {
            Projection::Include(config.include_fields.clone())
        } else if !config.exclude_fields.is_empty() {
            Projection::Exclude(config.exclude_fields.clone())
        } else {
            Projection::All
        }
    }

    pub fn apply(&self, book: &Book) -> Map<String, Value> {
        match self {
            Projection::All => book.to_map(),
            Projection::Include(names) => book.include(names),
            Projection::Exclude(names) => book.exclude(names),
        }
    }
}

/// Output formatter for validation results
pub struct Output {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    projection: Projection,
    show_colors: bool,
}

/// One failure as it appears in the JSON report
#[derive(Debug, Serialize)]
struct ErrorEntry<'a> {
    index: usize,
    title: Option<&'a str>,
    kind: BookErrorKind,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl<'a> From<&'a RecordError> for ErrorEntry<'a> {
    fn from(error: &'a RecordError) -> Self {
        let (field, value) = match &error.source {
            BookError::MissingIdentifier { .. } => (None, None),
            BookError::InvalidIsbn10Format { value, .. } => {
                (Some("isbn_10"), Some(Value::String(value.clone())))
            }
            BookError::Schema { field, value, .. } => (Some(field.as_str()), value.clone()),
        };

        Self {
            index: error.index,
            title: error.title.as_deref(),
            kind: error.kind(),
            message: error.source.message(),
            field,
            value,
        }
    }
}

impl Output {
    pub fn new(verbosity: VerbosityLevel, format: OutputFormat, projection: Projection) -> Self {
        Self {
            verbosity,
            format,
            projection,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn without_colors(mut self) -> Self {
        self.show_colors = false;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_results(&self, results: &ValidationResults) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(self.format_human(results)),
            OutputFormat::Summary => Ok(self.format_summary_only(results)),
            OutputFormat::Json => self.format_json(results),
        }
    }

    fn format_human(&self, results: &ValidationResults) -> String {
        let mut output = String::new();

        for outcome in &results.outcomes {
            if self.verbosity == VerbosityLevel::Quiet && outcome.is_valid() {
                continue;
            }
            output.push_str(&self.format_outcome(outcome));
            output.push('\n');
        }

        if self.verbosity != VerbosityLevel::Quiet {
            if !results.outcomes.is_empty() {
                output.push('\n');
            }
            output.push_str(&self.format_summary(results));
        }

        output
    }

    fn format_summary_only(&self, results: &ValidationResults) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => {
                if results.has_errors() {
                    format!("Invalid: {}\n", results.invalid_records)
                } else {
                    String::new()
                }
            }
            VerbosityLevel::Normal | VerbosityLevel::Verbose => self.format_summary(results),
        }
    }

    pub fn format_outcome(&self, outcome: &RecordOutcome) -> String {
        match &outcome.result {
            Ok(book) => {
                let projected = Value::Object(self.projection.apply(book));
                format!(
                    "{}  [{}] {}",
                    self.colorize("✓ VALID", "32"),
                    outcome.index,
                    projected
                )
            }
            Err(error) => {
                let mut output = format!(
                    "{}  [{}] {}",
                    self.colorize("✗ INVALID", "31"),
                    outcome.index,
                    error.source
                );
                if self.verbosity == VerbosityLevel::Verbose {
                    output.push_str(&format!("\n    kind: {}", error.kind()));
                    if let Some(title) = &error.title {
                        output.push_str(&format!("\n    title: {}", title));
                    }
                }
                output
            }
        }
    }

    fn format_summary(&self, results: &ValidationResults) -> String {
        let mut output = String::new();
        output.push_str("Validation Summary:\n");
        output.push_str(&format!("  Total records: {}\n", results.total_records));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            results.valid_records
        ));

        if results.invalid_records > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                results.invalid_records
            ));
        }
        if results.skipped_records() > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Skipped:", "36"),
                results.skipped_records()
            ));
        }

        output.push_str(&format!("  Success rate: {:.1}%\n", results.success_rate()));

        if self.verbosity == VerbosityLevel::Verbose {
            output.push_str(&format!(
                "  Duration: {}\n",
                format_duration(results.duration)
            ));
        }

        output
    }

    fn format_json(&self, results: &ValidationResults) -> Result<String> {
        let books: Vec<Value> = results
            .books()
            .map(|book| Value::Object(self.projection.apply(book)))
            .collect();
        let errors: Vec<ErrorEntry<'_>> = results.errors().map(ErrorEntry::from).collect();

        let document = json!({
            "summary": {
                "total_records": results.total_records,
                "valid_records": results.valid_records,
                "invalid_records": results.invalid_records,
                "skipped_records": results.skipped_records(),
            },
            "books": books,
            "errors": errors,
        });

        let mut rendered = serde_json::to_string_pretty(&document)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else {
        format!("{:.2}s", total_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::RawRecord;
    use crate::validator::{FailurePolicy, validate_all};

    fn records() -> Vec<RawRecord> {
        let value = json!([
            {
                "title": "Programming Rust",
                "author": "Jim Blandy",
                "publisher": "O'Reilly",
                "price": 39.99,
                "isbn_10": "1-4920-5259-0"
            },
            {
                "title": "Untraceable",
                "author": "Nobody",
                "publisher": "Nowhere",
                "price": 1.0
            }
        ]);
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn results() -> ValidationResults {
        validate_all(&records(), FailurePolicy::Collect)
    }

    fn output(verbosity: VerbosityLevel, format: OutputFormat, projection: Projection) -> Output {
        Output::new(verbosity, format, projection).without_colors()
    }

    #[test]
    fn test_human_output() {
        let formatted = output(VerbosityLevel::Normal, OutputFormat::Human, Projection::All)
            .format_results(&results())
            .unwrap();
        assert!(formatted.contains("✓ VALID  [0]"));
        assert!(formatted.contains("\"isbn_10\":\"1-4920-5259-0\""));
        assert!(formatted.contains("✗ INVALID  [1] Missing identifier for \"Untraceable\""));
        assert!(!formatted.contains("kind: MissingIdentifier"));
        assert!(!formatted.contains("Duration:"));
        assert!(formatted.contains("Validation Summary:"));
        assert!(formatted.contains("Valid: 1"));
        assert!(formatted.contains("Invalid: 1"));
        assert!(formatted.contains("Success rate: 50.0%"));
    }

    #[test]
    fn test_quiet_output_shows_only_failures() {
        let formatted = output(VerbosityLevel::Quiet, OutputFormat::Human, Projection::All)
            .format_results(&results())
            .unwrap();
        assert!(!formatted.contains("VALID  [0]"));
        assert!(formatted.contains("INVALID  [1]"));
        assert!(!formatted.contains("Validation Summary:"));
    }

    #[test]
    fn test_verbose_output_adds_details() {
        let formatted = output(VerbosityLevel::Verbose, OutputFormat::Human, Projection::All)
            .format_results(&results())
            .unwrap();
        assert!(formatted.contains("kind: MissingIdentifier"));
        assert!(formatted.contains("title: Untraceable"));
        assert!(formatted.contains("Duration:"));
    }

    #[test]
    fn test_include_projection_in_human_output() {
        let projection = Projection::Include(vec!["title".to_string(), "author".to_string()]);
        let formatted = output(VerbosityLevel::Normal, OutputFormat::Human, projection)
            .format_results(&results())
            .unwrap();
        assert!(formatted.contains(r#"{"author":"Jim Blandy","title":"Programming Rust"}"#));
        assert!(!formatted.contains("O'Reilly"));
    }

    #[test]
    fn test_summary_output() {
        let formatted = output(VerbosityLevel::Normal, OutputFormat::Summary, Projection::All)
            .format_results(&results())
            .unwrap();
        assert!(formatted.starts_with("Validation Summary:"));
        assert!(!formatted.contains("[0]"));

        let quiet = output(VerbosityLevel::Quiet, OutputFormat::Summary, Projection::All)
            .format_results(&results())
            .unwrap();
        assert_eq!(quiet, "Invalid: 1\n");
    }

    #[test]
    fn test_json_output() {
        let projection = Projection::Exclude(vec!["price".to_string()]);
        let formatted = output(VerbosityLevel::Normal, OutputFormat::Json, projection)
            .format_results(&results())
            .unwrap();
        let document: Value = serde_json::from_str(&formatted).unwrap();

        assert_eq!(document["summary"]["total_records"], 2);
        assert_eq!(document["summary"]["invalid_records"], 1);
        assert_eq!(document["books"].as_array().unwrap().len(), 1);
        assert!(document["books"][0].get("price").is_none());
        assert_eq!(document["books"][0]["title"], "Programming Rust");

        let error = &document["errors"][0];
        assert_eq!(error["index"], 1);
        assert_eq!(error["kind"], "MissingIdentifier");
        assert_eq!(error["title"], "Untraceable");
        assert_eq!(error["message"], "Must have at least one ISBN.");
        assert!(error.get("field").is_none());
    }

    #[test]
    fn test_json_error_entry_for_isbn10() {
        let error = RecordError::new(4, None, BookError::isbn10_checksum("0471958698"));
        let entry = serde_json::to_value(ErrorEntry::from(&error)).unwrap();
        assert_eq!(entry["kind"], "InvalidISBN10Format");
        assert_eq!(entry["field"], "isbn_10");
        assert_eq!(entry["value"], "0471958698");
        assert_eq!(entry["title"], Value::Null);
    }

    #[test]
    fn test_projection_from_config() {
        let mut config = OutputConfig::default();
        assert_eq!(Projection::from_config(&config), Projection::All);

        config.exclude_fields = vec!["subtitle".to_string()];
        assert_eq!(
            Projection::from_config(&config),
            Projection::Exclude(vec!["subtitle".to_string()])
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }
}
