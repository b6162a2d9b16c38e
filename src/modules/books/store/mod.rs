//! Persistence adapter for book documents.

use async_trait::async_trait;
use bookshelf_db::StoreError;

use super::models::{Book, BookFilter, NewBook, Page};

mod memory;
mod mongo;

pub use memory::InMemoryBookStore;
pub use mongo::MongoBookStore;

/// Document-store operations the HTTP handlers depend on.
///
/// Identifiers are the hex form of an ObjectId; malformed ones fail with
/// [`StoreError::InvalidId`].
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new book under a freshly generated id.
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Matching books in natural order, windowed by `page`.
    async fn find(&self, filter: &BookFilter, page: Page) -> Result<Vec<Book>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Replace the stored document with `book`.
    async fn save(&self, book: &Book) -> Result<(), StoreError>;

    /// Atomically remove a book, returning it if it existed.
    async fn delete_by_id(&self, id: &str) -> Result<Option<Book>, StoreError>;
}
