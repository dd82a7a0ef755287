//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;
use validate_books::RawRecord;

/// A record that passes every check
pub fn valid_book() -> Value {
    json!({
        "title": "Numerical Recipes",
        "subtitle": "The Art of Scientific Computing",
        "author": "William H. Press",
        "publisher": "Cambridge University Press",
        "price": 89.5,
        "isbn_10": "0-471-95869-7",
        "isbn_13": "978-0471958697"
    })
}

/// `valid_book` with one key replaced, or removed when `value` is `None`
pub fn book_with(key: &str, value: Option<Value>) -> Value {
    let mut book = valid_book();
    let object = book.as_object_mut().expect("fixture is an object");
    match value {
        Some(value) => {
            object.insert(key.to_string(), value);
        }
        None => {
            object.remove(key);
        }
    }
    book
}

pub fn raw(value: Value) -> RawRecord {
    value
        .as_object()
        .cloned()
        .expect("fixture must be a JSON object")
}

/// Write `records` as a catalog file inside a fresh temporary directory
pub fn write_catalog(records: &[Value]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.json");
    std::fs::write(&path, serde_json::to_string_pretty(records).unwrap()).unwrap();
    (temp_dir, path)
}
