//! Record Validation
//!
//! Turns raw key-value records into [`Book`] values. Validation of a single
//! record runs in two phases:
//! - **Structural**: the raw record must carry at least one ISBN. This runs
//!   before any field is read, so a record without identifiers always reports
//!   [`BookError::MissingIdentifier`] even if other fields are also broken.
//! - **Per field**: declared fields are copied in declaration order with type
//!   checks, then a present ISBN-10 is checked against its weighted checksum.
//!
//! Records are independent of each other. [`validate_all`] and
//! [`validate_all_parallel`] apply a [`FailurePolicy`] over a sequence and
//! always report outcomes in input order.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;

use crate::book::{Book, BookField, RawRecord};
use crate::error::{BookError, BookResult, RecordError};

/// What to do with the remaining records once one fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first invalid record
    FailFast,
    /// Validate every record and report all failures
    #[default]
    Collect,
}

impl FailurePolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Collect
        }
    }
}

/// Validate one raw record.
///
/// # Errors
///
/// - [`BookError::MissingIdentifier`] if neither `isbn_10` nor `isbn_13` is present
/// - [`BookError::Schema`] if a required field is missing or a field has the wrong type
/// - [`BookError::InvalidIsbn10Format`] if `isbn_10` fails the length or checksum check
pub fn validate(raw: &RawRecord) -> BookResult<Book> {
    check_identifier_presence(raw)?;

    let title = required_text(raw, BookField::Title)?;
    let author = required_text(raw, BookField::Author)?;
    let publisher = required_text(raw, BookField::Publisher)?;
    let price = required_price(raw)?;
    let isbn_10 = optional_text(raw, BookField::Isbn10)?;
    let isbn_13 = optional_text(raw, BookField::Isbn13)?;
    let subtitle = optional_text(raw, BookField::Subtitle)?;

    if let Some(isbn_10) = &isbn_10 {
        validate_isbn10(isbn_10)?;
    }

    Ok(Book::from_validated_parts(
        title, author, publisher, price, isbn_10, isbn_13, subtitle,
    ))
}

impl TryFrom<&RawRecord> for Book {
    type Error = BookError;

    fn try_from(raw: &RawRecord) -> BookResult<Self> {
        validate(raw)
    }
}

/// Whole-record check run against the untyped input. A `null` identifier counts as absent.
pub fn check_identifier_presence(raw: &RawRecord) -> BookResult<()> {
    let has_isbn = [BookField::Isbn10, BookField::Isbn13]
        .into_iter()
        .any(|field| present(raw, field).is_some());

    if has_isbn {
        Ok(())
    } else {
        Err(BookError::missing_identifier(raw_title(raw)))
    }
}

/// Check an ISBN-10 value.
///
/// Characters other than ASCII digits and `X`/`x` are discarded first, so
/// `"0-471-95869-7"` is checked as `"0471958697"`. The remaining ten
/// characters are weighted 10 down to 1 and the sum must be divisible by 11.
pub fn validate_isbn10(value: &str) -> BookResult<()> {
    let digits: Vec<u32> = value.chars().filter_map(isbn10_digit_value).collect();

    if digits.len() != 10 {
        return Err(BookError::isbn10_length(value));
    }

    if isbn10_weighted_sum(&digits) % 11 != 0 {
        return Err(BookError::isbn10_checksum(value));
    }

    Ok(())
}

fn isbn10_digit_value(c: char) -> Option<u32> {
    match c {
        'X' | 'x' => Some(10),
        _ => c.to_digit(10),
    }
}

fn isbn10_weighted_sum(digits: &[u32]) -> u32 {
    digits
        .iter()
        .enumerate()
        .map(|(i, value)| (10 - i as u32) * value)
        .sum()
}

fn present(raw: &RawRecord, field: BookField) -> Option<&Value> {
    raw.get(field.name()).filter(|value| !value.is_null())
}

fn raw_title(raw: &RawRecord) -> Option<String> {
    raw.get(BookField::Title.name()).and_then(text_value)
}

/// Text fields take strings as-is and render numbers in their JSON form.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn required_text(raw: &RawRecord, field: BookField) -> BookResult<String> {
    let value = raw
        .get(field.name())
        .ok_or_else(|| BookError::missing_field(field.name()))?;

    text_value(value).ok_or_else(|| BookError::type_mismatch(field.name(), value, "a string"))
}

fn optional_text(raw: &RawRecord, field: BookField) -> BookResult<Option<String>> {
    present(raw, field)
        .map(|value| {
            text_value(value).ok_or_else(|| {
                BookError::type_mismatch(field.name(), value, "a string or null")
            })
        })
        .transpose()
}

/// Numbers are taken as-is, booleans count as 1 and 0, and numeric strings
/// such as `"12.50"` are coerced. The result must be finite.
fn required_price(raw: &RawRecord) -> BookResult<f64> {
    let field = BookField::Price.name();
    let value = raw
        .get(field)
        .ok_or_else(|| BookError::missing_field(field))?;

    let price = match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    price
        .filter(|price| price.is_finite())
        .ok_or_else(|| BookError::type_mismatch(field, value, "a finite number"))
}

/// Result of validating the record at `index` of the input
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub index: usize,
    pub result: Result<Book, RecordError>,
}

impl RecordOutcome {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }

    pub fn book(&self) -> Option<&Book> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RecordError> {
        self.result.as_ref().err()
    }
}

/// Outcomes of validating a sequence of records, in input order
#[derive(Debug, Clone, Default)]
pub struct ValidationResults {
    /// One entry per visited record
    pub outcomes: Vec<RecordOutcome>,
    /// Number of records in the input, visited or not
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub duration: Duration,
}

impl ValidationResults {
    pub fn from_outcomes(
        outcomes: Vec<RecordOutcome>,
        total_records: usize,
        duration: Duration,
    ) -> Self {
        let valid_records = outcomes.iter().filter(|o| o.is_valid()).count();
        let invalid_records = outcomes.len() - valid_records;

        Self {
            outcomes,
            total_records,
            valid_records,
            invalid_records,
            duration,
        }
    }

    /// Records left unvisited after a fail-fast stop
    pub fn skipped_records(&self) -> usize {
        self.total_records - self.outcomes.len()
    }

    pub fn has_errors(&self) -> bool {
        self.invalid_records > 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            100.0
        } else {
            (self.valid_records as f64 / self.total_records as f64) * 100.0
        }
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.outcomes.iter().filter_map(RecordOutcome::book)
    }

    pub fn errors(&self) -> impl Iterator<Item = &RecordError> {
        self.outcomes.iter().filter_map(RecordOutcome::error)
    }

    /// All books, or the first failure for callers that treat any failure as fatal
    pub fn into_books(self) -> Result<Vec<Book>, RecordError> {
        self.outcomes
            .into_iter()
            .map(|outcome| outcome.result)
            .collect()
    }
}

/// Validate records one after another, honouring `policy`.
pub fn validate_all(records: &[RawRecord], policy: FailurePolicy) -> ValidationResults {
    let start = Instant::now();
    let mut outcomes = Vec::with_capacity(records.len());

    for (index, raw) in records.iter().enumerate() {
        let outcome = validate_indexed(index, raw);
        let failed = !outcome.is_valid();
        outcomes.push(outcome);

        if failed && policy == FailurePolicy::FailFast {
            break;
        }
    }

    ValidationResults::from_outcomes(outcomes, records.len(), start.elapsed())
}

/// Validate records on the rayon pool. Outcomes keep input order, and a
/// fail-fast policy truncates after the first failure exactly as
/// [`validate_all`] would.
pub fn validate_all_parallel(records: &[RawRecord], policy: FailurePolicy) -> ValidationResults {
    let start = Instant::now();
    let mut outcomes: Vec<RecordOutcome> = records
        .par_iter()
        .enumerate()
        .map(|(index, raw)| validate_indexed(index, raw))
        .collect();

    if policy == FailurePolicy::FailFast
        && let Some(first_failure) = outcomes.iter().position(|o| !o.is_valid())
    {
        outcomes.truncate(first_failure + 1);
    }

    ValidationResults::from_outcomes(outcomes, records.len(), start.elapsed())
}

fn validate_indexed(index: usize, raw: &RawRecord) -> RecordOutcome {
    let result = validate(raw).map_err(|error| RecordError::new(index, raw_title(raw), error));

    match &result {
        Ok(book) => debug!(index, title = %book.title(), "record accepted"),
        Err(error) => debug!(index, kind = %error.kind(), error = %error.source, "record rejected"),
    }

    RecordOutcome { index, result }
}
