//! Validated Book Entity
//!
//! A [`Book`] can only be obtained through the record validator, so every
//! value of this type upholds the catalog invariants: at least one ISBN is
//! present and a present ISBN-10 passes its checksum. Fields are private and
//! only exposed through getters; once built, a book never changes.
//!
//! ```compile_fail
//! use serde_json::json;
//! use validate_books::validate;
//!
//! let raw = json!({
//!     "title": "Dune", "author": "Frank Herbert", "publisher": "Chilton",
//!     "price": 9.99, "isbn_13": "9780441013593"
//! });
//! let mut book = validate(raw.as_object().unwrap()).unwrap();
//! book.title = "Dune Messiah".to_string();
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// One raw record as parsed from the input file
pub type RawRecord = Map<String, Value>;

/// The declared fields of a [`Book`], in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BookField {
    Title,
    Author,
    Publisher,
    Price,
    Isbn10,
    Isbn13,
    Subtitle,
}

impl BookField {
    pub const ALL: [BookField; 7] = [
        BookField::Title,
        BookField::Author,
        BookField::Publisher,
        BookField::Price,
        BookField::Isbn10,
        BookField::Isbn13,
        BookField::Subtitle,
    ];

    /// Key used for this field in raw records and projections
    pub fn name(&self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Publisher => "publisher",
            BookField::Price => "price",
            BookField::Isbn10 => "isbn_10",
            BookField::Isbn13 => "isbn_13",
            BookField::Subtitle => "subtitle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            BookField::Title | BookField::Author | BookField::Publisher | BookField::Price
        )
    }
}

impl fmt::Display for BookField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated, immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    title: String,
    author: String,
    publisher: String,
    price: f64,
    isbn_10: Option<String>,
    isbn_13: Option<String>,
    subtitle: Option<String>,
}

impl Book {
    /// Only the validator may call this; it has already checked the invariants.
    pub(crate) fn from_validated_parts(
        title: String,
        author: String,
        publisher: String,
        price: f64,
        isbn_10: Option<String>,
        isbn_13: Option<String>,
        subtitle: Option<String>,
    ) -> Self {
        Self {
            title,
            author,
            publisher,
            price,
            isbn_10,
            isbn_13,
            subtitle,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// The ISBN-10 exactly as it appeared in the input, separators included
    pub fn isbn_10(&self) -> Option<&str> {
        self.isbn_10.as_deref()
    }

    pub fn isbn_13(&self) -> Option<&str> {
        self.isbn_13.as_deref()
    }

    /// Value of a single field; absent optionals render as `null`
    pub fn field_value(&self, field: BookField) -> Value {
        let optional = |value: &Option<String>| match value {
            Some(value) => Value::String(value.clone()),
            None => Value::Null,
        };

        match field {
            BookField::Title => Value::String(self.title.clone()),
            BookField::Author => Value::String(self.author.clone()),
            BookField::Publisher => Value::String(self.publisher.clone()),
            BookField::Price => Value::from(self.price),
            BookField::Isbn10 => optional(&self.isbn_10),
            BookField::Isbn13 => optional(&self.isbn_13),
            BookField::Subtitle => optional(&self.subtitle),
        }
    }

    /// Every declared field as a key-value mapping
    pub fn to_map(&self) -> Map<String, Value> {
        self.project(|_| true)
    }

    /// Only the named fields. Names that are not declared fields are ignored.
    pub fn include<I, S>(&self, names: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected = known_fields(names);
        self.project(|field| selected.contains(&field))
    }

    /// Every declared field except the named ones. Unknown names are ignored.
    pub fn exclude<I, S>(&self, names: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = known_fields(names);
        self.project(|field| !excluded.contains(&field))
    }

    fn project(&self, keep: impl Fn(BookField) -> bool) -> Map<String, Value> {
        BookField::ALL
            .into_iter()
            .filter(|field| keep(*field))
            .map(|field| (field.name().to_string(), self.field_value(field)))
            .collect()
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(subtitle) = &self.subtitle {
            write!(f, ": {}", subtitle)?;
        }
        write!(f, " by {} ({}, {:.2})", self.author, self.publisher, self.price)
    }
}

fn known_fields<I, S>(names: I) -> HashSet<BookField>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| BookField::from_name(name.as_ref()))
        .collect()
}
