use divan::Bencher;
use serde_json::json;
use validate_books::{FailurePolicy, RawRecord, validate, validate_all, validate_isbn10};

fn main() {
    divan::main();
}

fn sample_record() -> RawRecord {
    json!({
        "title": "Numerical Recipes",
        "author": "William H. Press",
        "publisher": "Cambridge University Press",
        "price": 89.5,
        "isbn_10": "0-471-95869-7",
        "isbn_13": "978-0471958697"
    })
    .as_object()
    .cloned()
    .expect("sample record is an object")
}

#[divan::bench(args = ["0471958697", "0-471-95869-7", "155404295X", "12345"])]
fn isbn10_checksum(isbn: &str) -> bool {
    validate_isbn10(divan::black_box(isbn)).is_ok()
}

#[divan::bench]
fn validate_single_record(bencher: Bencher) {
    let record = sample_record();

    bencher.bench_local(move || validate(divan::black_box(&record)).is_ok());
}

#[divan::bench(args = [10, 100, 1000])]
fn validate_catalog(bencher: Bencher, size: usize) {
    let records: Vec<RawRecord> = (0..size).map(|_| sample_record()).collect();

    bencher.bench_local(move || validate_all(&records, FailurePolicy::Collect).valid_records);
}
