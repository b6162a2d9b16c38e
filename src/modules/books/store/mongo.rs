use async_trait::async_trait;
use bookshelf_db::{parse_object_id, StoreError};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use super::BookStore;
use crate::modules::books::models::{Book, BookFilter, NewBook, Page};

/// On-disk shape of a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    publication_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Book {
            id: document.id.to_hex(),
            title: document.title,
            author: document.author,
            genre: document.genre,
            publication_year: document.publication_year,
            image_url: document.image_url,
            isbn: document.isbn,
            description: document.description,
        }
    }
}

impl BookDocument {
    fn from_book(book: &Book) -> Result<Self, StoreError> {
        Ok(Self {
            id: parse_object_id(&book.id)?,
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            publication_year: book.publication_year,
            image_url: book.image_url.clone(),
            isbn: book.isbn.clone(),
            description: book.description.clone(),
        })
    }
}

fn filter_document(filter: &BookFilter) -> Document {
    let mut document = Document::new();
    if let Some(genre) = &filter.genre {
        document.insert("genre", genre.as_str());
    }
    if let Some(author) = &filter.author {
        document.insert("author", author.as_str());
    }
    if let Some(year) = filter.publication_year {
        document.insert("publicationYear", year);
    }
    document
}

fn find_options(page: Page) -> FindOptions {
    let mut options = FindOptions::default();
    options.skip = Some(page.skip);
    options.limit = page
        .limit
        .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));
    options
}

/// [`BookStore`] backed by a MongoDB collection.
#[derive(Clone)]
pub struct MongoBookStore {
    collection: Collection<BookDocument>,
}

impl MongoBookStore {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let document = BookDocument {
            id: ObjectId::new(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            publication_year: book.publication_year,
            image_url: Some(book.image_url),
            isbn: book.isbn,
            description: book.description,
        };
        self.collection.insert_one(&document).await?;
        Ok(document.into())
    }

    async fn find(&self, filter: &BookFilter, page: Page) -> Result<Vec<Book>, StoreError> {
        let cursor = self
            .collection
            .find(filter_document(filter))
            .with_options(find_options(page))
            .await?;
        let documents: Vec<BookDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let id = parse_object_id(id)?;
        let document = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(document.map(Book::from))
    }

    async fn save(&self, book: &Book) -> Result<(), StoreError> {
        let document = BookDocument::from_book(book)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": document.id }, &document)
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::DocumentNotFound(book.id.clone()));
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let id = parse_object_id(id)?;
        let document = self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?;
        Ok(document.map(Book::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, Bson};

    #[test]
    fn filter_includes_only_supplied_fields() {
        assert!(filter_document(&BookFilter::default()).is_empty());

        let filter = BookFilter {
            genre: Some("Fantasy".to_string()),
            author: Some("Tolkien".to_string()),
            publication_year: Some(1954),
        };
        assert_eq!(
            filter_document(&filter),
            doc! { "genre": "Fantasy", "author": "Tolkien", "publicationYear": 1954 }
        );
    }

    #[test]
    fn find_options_translate_page_window() {
        let options = find_options(Page {
            skip: 20,
            limit: Some(10),
        });
        assert_eq!(options.skip, Some(20));
        assert_eq!(options.limit, Some(10));

        let options = find_options(Page {
            skip: 0,
            limit: None,
        });
        assert_eq!(options.limit, None);
    }

    #[test]
    fn documents_store_id_as_object_id_and_skip_empty_fields() {
        let book = Book {
            id: ObjectId::new().to_hex(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            genre: None,
            publication_year: Some(1965),
            image_url: None,
            isbn: None,
            description: None,
        };
        let document = bson::to_document(&BookDocument::from_book(&book).unwrap()).unwrap();
        assert!(matches!(document.get("_id"), Some(Bson::ObjectId(_))));
        assert_eq!(document.get_i32("publicationYear").unwrap(), 1965);
        assert!(!document.contains_key("genre"));

        let round_trip: BookDocument = bson::from_document(document).unwrap();
        assert_eq!(Book::from(round_trip), book);
    }

    #[test]
    fn malformed_ids_cannot_be_saved() {
        let book = Book {
            id: "123".to_string(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            genre: None,
            publication_year: None,
            image_url: None,
            isbn: None,
            description: None,
        };
        let err = BookDocument::from_book(&book).unwrap_err();
        assert_eq!(err.name(), "CastError");
    }
}
