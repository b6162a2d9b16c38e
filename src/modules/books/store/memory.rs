use async_trait::async_trait;
use bookshelf_db::{parse_object_id, StoreError};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::BookStore;
use crate::modules::books::models::{Book, BookFilter, NewBook, Page};

/// Process-local [`BookStore`]; natural order is insertion order.
///
/// Ids are real ObjectIds so malformed identifiers fail exactly as they
/// would against MongoDB.
#[derive(Default)]
pub struct InMemoryBookStore {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let book = Book {
            id: ObjectId::new().to_hex(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            publication_year: book.publication_year,
            image_url: Some(book.image_url),
            isbn: book.isbn,
            description: book.description,
        };
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn find(&self, filter: &BookFilter, page: Page) -> Result<Vec<Book>, StoreError> {
        let books = self.books.read().await;
        let skip = usize::try_from(page.skip).unwrap_or(usize::MAX);
        let limit = page
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(books
            .iter()
            .filter(|book| filter.matches(book))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let id = parse_object_id(id)?.to_hex();
        let books = self.books.read().await;
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    async fn save(&self, book: &Book) -> Result<(), StoreError> {
        parse_object_id(&book.id)?;
        let mut books = self.books.write().await;
        match books.iter_mut().find(|stored| stored.id == book.id) {
            Some(stored) => {
                *stored = book.clone();
                Ok(())
            }
            None => Err(StoreError::DocumentNotFound(book.id.clone())),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let id = parse_object_id(id)?.to_hex();
        let mut books = self.books.write().await;
        let position = books.iter().position(|book| book.id == id);
        Ok(position.map(|index| books.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str, genre: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Tolkien".to_string(),
            genre: Some(genre.to_string()),
            publication_year: None,
            image_url: "https://via.placeholder.com/150".to_string(),
            isbn: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_distinct_object_ids() {
        let store = InMemoryBookStore::new();
        let first = store.insert(new_book("A", "Fantasy")).await.unwrap();
        let second = store.insert(new_book("B", "Fantasy")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(ObjectId::parse_str(&first.id).is_ok());
    }

    #[tokio::test]
    async fn find_windows_matches_in_insertion_order() {
        let store = InMemoryBookStore::new();
        for (title, genre) in [("A", "Fantasy"), ("B", "Horror"), ("C", "Fantasy"), ("D", "Fantasy")] {
            store.insert(new_book(title, genre)).await.unwrap();
        }
        let filter = BookFilter {
            genre: Some("Fantasy".to_string()),
            ..BookFilter::default()
        };

        let titles = |books: Vec<Book>| books.into_iter().map(|b| b.title).collect::<Vec<_>>();
        let page = store
            .find(&filter, Page { skip: 1, limit: Some(1) })
            .await
            .unwrap();
        assert_eq!(titles(page), vec!["C"]);

        let all = store
            .find(&filter, Page { skip: 0, limit: None })
            .await
            .unwrap();
        assert_eq!(titles(all), vec!["A", "C", "D"]);
    }

    #[tokio::test]
    async fn save_replaces_and_delete_removes() {
        let store = InMemoryBookStore::new();
        let mut book = store.insert(new_book("A", "Fantasy")).await.unwrap();
        book.title = "A2".to_string();
        store.save(&book).await.unwrap();
        assert_eq!(store.find_by_id(&book.id).await.unwrap().unwrap().title, "A2");

        let removed = store.delete_by_id(&book.id).await.unwrap();
        assert_eq!(removed, Some(book.clone()));
        assert!(store.delete_by_id(&book.id).await.unwrap().is_none());

        let err = store.save(&book).await.unwrap_err();
        assert_eq!(err.name(), "DocumentNotFoundError");
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let store = InMemoryBookStore::new();
        let err = store.find_by_id("42").await.unwrap_err();
        assert_eq!(err.name(), "CastError");
        assert!(store.delete_by_id("42").await.is_err());
    }
}
