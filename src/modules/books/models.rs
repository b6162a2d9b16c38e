use bookshelf_db::StoreError;
use bookshelf_kernel::settings::PaginationSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::BookError;
use super::isbn;

/// Cover image stored when a book is created without one.
pub const DEFAULT_IMAGE_URL: &str = "https://via.placeholder.com/150";

/// Fields a client may overwrite through an update.
pub const UPDATABLE_FIELDS: &[&str] = &[
    "title",
    "author",
    "genre",
    "publicationYear",
    "imageUrl",
    "isbn",
    "description",
];

/// A stored book as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier (hex ObjectId)
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request body for creating a book, kept as raw JSON so its values are
/// cast with the same rules an update uses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct CreateBook {
    fields: Map<String, Value>,
}

/// A validated book ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub image_url: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
}

impl CreateBook {
    pub fn from_body(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    fn field(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&Value::Null)
    }

    /// Request checks first: title and author must be truthy and a truthy
    /// ISBN must be well formed. These fail with [`BookError::Validation`].
    /// Field values are then cast like a saved document, so `"1954"` is a
    /// year and `1984` is a title; a failed cast is a store validation error.
    pub fn validate(self) -> Result<NewBook, BookError> {
        if !truthy(self.field("title")) || !truthy(self.field("author")) {
            return Err(BookError::validation("Title and author are required"));
        }

        let isbn = self.field("isbn");
        if truthy(isbn) {
            let text = match isbn {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !isbn::is_valid(&text) {
                return Err(BookError::validation("Invalid ISBN format"));
            }
        }

        let image_url = match self.field("imageUrl") {
            value if truthy(value) => cast_string("imageUrl", value)?,
            _ => None,
        };

        Ok(NewBook {
            title: required_string("title", self.field("title"))?,
            author: required_string("author", self.field("author"))?,
            genre: cast_string("genre", self.field("genre"))?,
            publication_year: cast_year("publicationYear", self.field("publicationYear"))?,
            image_url: image_url.unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            isbn: cast_string("isbn", isbn)?,
            description: cast_string("description", self.field("description"))?,
        })
    }
}

/// JavaScript truthiness, which decides whether a create field counts as given.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Exact-match filter; `None` fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<i32>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        self.genre
            .as_ref()
            .map_or(true, |genre| book.genre.as_ref() == Some(genre))
            && self
                .author
                .as_ref()
                .map_or(true, |author| &book.author == author)
            && self
                .publication_year
                .map_or(true, |year| book.publication_year == Some(year))
    }
}

/// Skip/limit window. `limit: None` returns every remaining match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: Option<u64>,
}

/// Raw list query parameters. Kept as strings so empty values can be
/// ignored and bad numbers reported with a readable message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// Split into a filter and a page window.
    ///
    /// `page` defaults to 1 and values below 1 are treated as 1. `limit`
    /// defaults to the configured default; `0` means unbounded unless a
    /// maximum is configured, in which case every limit is capped to it.
    pub fn into_query(self, pagination: &PaginationSettings) -> Result<(BookFilter, Page), BookError> {
        let filter = BookFilter {
            genre: non_empty(self.genre),
            author: non_empty(self.author),
            publication_year: parse_param("publicationYear", self.publication_year)?,
        };

        let page = parse_param::<u64>("page", self.page)?.unwrap_or(1).max(1);
        let requested = parse_param::<u64>("limit", self.limit)?.unwrap_or(pagination.default_limit);
        let limit = match (requested, pagination.max_limit) {
            (0, None) => None,
            (0, Some(max)) => Some(max),
            (n, Some(max)) => Some(n.min(max)),
            (n, None) => Some(n),
        };
        let skip = (page - 1).saturating_mul(limit.unwrap_or(0));

        Ok((filter, Page { skip, limit }))
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, BookError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| BookError::validation(format!("Invalid {} parameter", name))),
    }
}

/// A validated set of field replacements for an existing book.
#[derive(Debug, Clone)]
pub struct BookUpdate {
    fields: Map<String, Value>,
}

impl BookUpdate {
    /// Accepts the body only if every key is an updatable field.
    pub fn from_body(fields: Map<String, Value>) -> Result<Self, BookError> {
        if fields
            .keys()
            .all(|key| UPDATABLE_FIELDS.contains(&key.as_str()))
        {
            Ok(Self { fields })
        } else {
            Err(BookError::validation("Invalid updates"))
        }
    }

    /// Overwrite each supplied field on `book`. Values are checked the way
    /// the store checks a document on save: required strings must be
    /// present and non-empty, and every value must cast to its field type.
    pub fn apply(&self, book: &mut Book) -> Result<(), StoreError> {
        for (field, value) in &self.fields {
            match field.as_str() {
                "title" => book.title = required_string(field, value)?,
                "author" => book.author = required_string(field, value)?,
                "genre" => book.genre = cast_string(field, value)?,
                "publicationYear" => book.publication_year = cast_year(field, value)?,
                "imageUrl" => book.image_url = cast_string(field, value)?,
                "isbn" => book.isbn = cast_string(field, value)?,
                "description" => book.description = cast_string(field, value)?,
                other => {
                    return Err(StoreError::Invalid(format!(
                        "Book validation failed: {}: unknown field",
                        other
                    )))
                }
            }
        }
        Ok(())
    }
}

fn cast_error(path: &str, value: &Value, kind: &str) -> StoreError {
    StoreError::Invalid(format!(
        "Book validation failed: {}: Cast to {} failed for value \"{}\" at path \"{}\"",
        path, kind, value, path
    ))
}

fn cast_string(path: &str, value: &Value) -> Result<Option<String>, StoreError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(cast_error(path, value, "string")),
    }
}

fn required_string(path: &str, value: &Value) -> Result<String, StoreError> {
    cast_string(path, value)?
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            StoreError::Invalid(format!(
                "Book validation failed: {}: Path `{}` is required.",
                path, path
            ))
        })
}

fn cast_year(path: &str, value: &Value) -> Result<Option<i32>, StoreError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .and_then(|year| i32::try_from(year).ok())
            .map(Some)
            .ok_or_else(|| cast_error(path, value, "Number")),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| cast_error(path, value, "Number")),
        _ => Err(cast_error(path, value, "Number")),
    }
}
