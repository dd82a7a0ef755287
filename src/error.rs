use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigError;

/// Message carried by [`BookError::MissingIdentifier`].
pub const MISSING_IDENTIFIER_MESSAGE: &str = "Must have at least one ISBN.";

/// Message carried by [`BookError::InvalidIsbn10Format`] when the length check fails.
pub const ISBN10_LENGTH_MESSAGE: &str = "ISBN-10 must be 10 digits.";

/// Message carried by [`BookError::InvalidIsbn10Format`] when the checksum fails.
pub const ISBN10_CHECKSUM_MESSAGE: &str = "ISBN-10 weighted sum must be divisible by 11.";

/// Why a single raw record could not become a [`crate::Book`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("Missing identifier for {}: {message}", describe_title(.title))]
    MissingIdentifier {
        title: Option<String>,
        message: String,
    },

    #[error("Invalid ISBN-10 format: {value:?} - {message}")]
    InvalidIsbn10Format { value: String, message: String },

    #[error("Schema error: field '{field}' {reason} (value: {})", describe_value(.value))]
    Schema {
        field: String,
        value: Option<Value>,
        reason: String,
    },
}

/// Discriminant of a [`BookError`], for callers that branch on the kind only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BookErrorKind {
    MissingIdentifier,
    #[serde(rename = "InvalidISBN10Format")]
    InvalidIsbn10Format,
    SchemaError,
}

impl BookErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookErrorKind::MissingIdentifier => "MissingIdentifier",
            BookErrorKind::InvalidIsbn10Format => "InvalidISBN10Format",
            BookErrorKind::SchemaError => "SchemaError",
        }
    }
}

impl fmt::Display for BookErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BookError {
    pub fn missing_identifier(title: Option<String>) -> Self {
        BookError::MissingIdentifier {
            title,
            message: MISSING_IDENTIFIER_MESSAGE.to_string(),
        }
    }

    pub fn isbn10_length(value: impl Into<String>) -> Self {
        BookError::InvalidIsbn10Format {
            value: value.into(),
            message: ISBN10_LENGTH_MESSAGE.to_string(),
        }
    }

    pub fn isbn10_checksum(value: impl Into<String>) -> Self {
        BookError::InvalidIsbn10Format {
            value: value.into(),
            message: ISBN10_CHECKSUM_MESSAGE.to_string(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        BookError::Schema {
            field: field.into(),
            value: None,
            reason: "is required".to_string(),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, value: &Value, expected: &str) -> Self {
        BookError::Schema {
            field: field.into(),
            value: Some(value.clone()),
            reason: format!("must be {}, found {}", expected, json_type_name(value)),
        }
    }

    pub fn kind(&self) -> BookErrorKind {
        match self {
            BookError::MissingIdentifier { .. } => BookErrorKind::MissingIdentifier,
            BookError::InvalidIsbn10Format { .. } => BookErrorKind::InvalidIsbn10Format,
            BookError::Schema { .. } => BookErrorKind::SchemaError,
        }
    }

    /// Human-readable explanation without the offending value
    pub fn message(&self) -> &str {
        match self {
            BookError::MissingIdentifier { message, .. } => message,
            BookError::InvalidIsbn10Format { message, .. } => message,
            BookError::Schema { reason, .. } => reason,
        }
    }
}

/// A [`BookError`] tagged with the position of the record in the input
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Record {index}{}: {source}", describe_record_title(.title))]
pub struct RecordError {
    pub index: usize,
    pub title: Option<String>,
    pub source: BookError,
}

impl RecordError {
    pub fn new(index: usize, title: Option<String>, source: BookError) -> Self {
        Self {
            index,
            title,
            source,
        }
    }

    pub fn kind(&self) -> BookErrorKind {
        self.source.kind()
    }
}

/// Application error covering loading and configuration failures
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input{}: {reason}", describe_position(.index))]
    InvalidInput { index: Option<usize>, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ConfigError> for CatalogError {
    fn from(err: ConfigError) -> Self {
        CatalogError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Per-record validation result type alias
pub type BookResult<T> = std::result::Result<T, BookError>;

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe_title(title: &Option<String>) -> String {
    match title {
        Some(title) => format!("{:?}", title),
        None => "untitled record".to_string(),
    }
}

fn describe_record_title(title: &Option<String>) -> String {
    match title {
        Some(title) => format!(" ({:?})", title),
        None => String::new(),
    }
}

fn describe_value(value: &Option<Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "missing".to_string(),
    }
}

fn describe_position(index: &Option<usize>) -> String {
    match index {
        Some(index) => format!(" at record {}", index),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_identifier_display() {
        let error = BookError::missing_identifier(Some("Dune".to_string()));
        let message = error.to_string();
        assert!(message.contains("Missing identifier"));
        assert!(message.contains("Dune"));
        assert!(message.contains(MISSING_IDENTIFIER_MESSAGE));

        let untitled = BookError::missing_identifier(None);
        assert!(untitled.to_string().contains("untitled record"));
    }

    #[test]
    fn test_isbn10_error_display() {
        let length = BookError::isbn10_length("12345");
        assert!(length.to_string().contains("12345"));
        assert!(length.to_string().contains("ISBN-10 must be 10 digits."));

        let checksum = BookError::isbn10_checksum("0471958698");
        assert!(checksum.to_string().contains("0471958698"));
        assert!(checksum.to_string().contains("divisible by 11"));
    }

    #[test]
    fn test_schema_error_display() {
        let missing = BookError::missing_field("author");
        assert!(missing.to_string().contains("'author'"));
        assert!(missing.to_string().contains("is required"));
        assert!(missing.to_string().contains("missing"));

        let mismatch = BookError::type_mismatch("price", &json!("cheap"), "a number");
        let message = mismatch.to_string();
        assert!(message.contains("'price'"));
        assert!(message.contains("must be a number, found string"));
        assert!(message.contains("\"cheap\""));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BookError::missing_identifier(None).kind(),
            BookErrorKind::MissingIdentifier
        );
        assert_eq!(
            BookError::isbn10_length("1").kind(),
            BookErrorKind::InvalidIsbn10Format
        );
        assert_eq!(
            BookError::missing_field("title").kind(),
            BookErrorKind::SchemaError
        );
        assert_eq!(BookErrorKind::InvalidIsbn10Format.to_string(), "InvalidISBN10Format");
    }

    #[test]
    fn test_error_message_accessor() {
        assert_eq!(
            BookError::isbn10_checksum("x").message(),
            ISBN10_CHECKSUM_MESSAGE
        );
        assert_eq!(
            BookError::missing_identifier(None).message(),
            MISSING_IDENTIFIER_MESSAGE
        );
    }

    #[test]
    fn test_record_error_source_chain() {
        use std::error::Error;

        let record_error = RecordError::new(
            3,
            Some("Dune".to_string()),
            BookError::isbn10_length("12345"),
        );
        let message = record_error.to_string();
        assert!(message.starts_with("Record 3 (\"Dune\")"));
        assert!(record_error.source().is_some());
        assert_eq!(record_error.kind(), BookErrorKind::InvalidIsbn10Format);
    }

    #[test]
    fn test_catalog_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let catalog_error: CatalogError = io_error.into();
        assert!(matches!(catalog_error, CatalogError::Io(_)));

        let config_error = ConfigError::Validation("bad".to_string());
        let catalog_error: CatalogError = config_error.into();
        match catalog_error {
            CatalogError::Config(message) => assert!(message.contains("bad")),
            other => panic!("Expected CatalogError::Config, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_input_display() {
        let top_level = CatalogError::InvalidInput {
            index: None,
            reason: "expected an array of records".to_string(),
        };
        assert_eq!(
            top_level.to_string(),
            "Invalid input: expected an array of records"
        );

        let element = CatalogError::InvalidInput {
            index: Some(2),
            reason: "expected an object".to_string(),
        };
        assert!(element.to_string().contains("at record 2"));
    }
}
