//! Catalog file loading
//!
//! Reads a UTF-8 JSON document whose top level is an array of objects and
//! hands the objects to the validator untouched.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::book::RawRecord;
use crate::error::{CatalogError, Result, json_type_name};

/// Load raw records from a catalog file
pub async fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let content = tokio::fs::read_to_string(path).await?;
    let records = parse_records(&content)?;
    debug!(path = %path.display(), records = records.len(), "catalog loaded");
    Ok(records)
}

/// Parse raw records from catalog text
pub fn parse_records(content: &str) -> Result<Vec<RawRecord>> {
    let document: Value = serde_json::from_str(content)?;

    let items = match document {
        Value::Array(items) => items,
        other => {
            return Err(CatalogError::InvalidInput {
                index: None,
                reason: format!(
                    "expected an array of records, found {}",
                    json_type_name(&other)
                ),
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(CatalogError::InvalidInput {
                index: Some(index),
                reason: format!(
                    "expected an object, found {}",
                    json_type_name(&other)
                ),
            }),
        })
        .collect()
}
