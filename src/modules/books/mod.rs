pub mod error;
pub mod isbn;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::settings::PaginationSettings;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use routes::BooksState;
use store::BookStore;

/// Book catalogue: CRUD over `/api/books`.
pub struct BooksModule {
    state: BooksState,
    collection: String,
}

impl BooksModule {
    /// `collection` names the MongoDB collection the store writes to; it is
    /// only used for index migrations.
    pub fn new(
        store: Arc<dyn BookStore>,
        pagination: PaginationSettings,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            state: BooksState { store, pagination },
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_filter_indexes",
            command: json!({
                "createIndexes": self.collection,
                "indexes": [
                    { "key": { "author": 1 }, "name": "author_1" },
                    { "key": { "genre": 1 }, "name": "genre_1" },
                    { "key": { "publicationYear": 1 }, "name": "publicationYear_1" }
                ]
            }),
        }]
    }
}

fn error_response(description: &str, schema: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": { "$ref": "#/components/schemas/Book" } }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });
    let query_param = |name: &str, kind: &str| {
        json!({ "name": name, "in": "query", "required": false, "schema": { "type": kind } })
    };
    let book_body = |schema: &str| {
        json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                }
            }
        })
    };

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "parameters": [
                        query_param("genre", "string"),
                        query_param("author", "string"),
                        query_param("publicationYear", "integer"),
                        query_param("page", "integer"),
                        query_param("limit", "integer")
                    ],
                    "responses": {
                        "200": {
                            "description": "Matching books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "400": error_response("Invalid query parameter", "ErrorResponse"),
                        "500": error_response("Store failure", "StoreErrorResponse")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_body("CreateBook"),
                    "responses": {
                        "201": book_response("Created book"),
                        "400": error_response("Missing title/author or invalid ISBN", "ErrorResponse"),
                        "500": error_response("Store failure", "StoreErrorResponse")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Fetch a book",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "responses": {
                        "200": book_response("The book"),
                        "404": error_response("Book not found", "ErrorResponse"),
                        "500": error_response("Store failure", "StoreErrorResponse")
                    }
                },
                "put": {
                    "summary": "Replace selected fields of a book",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "requestBody": book_body("UpdateBook"),
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("Invalid updates or store failure", "StoreErrorResponse"),
                        "404": error_response("Book not found", "ErrorResponse")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "responses": {
                        "200": book_response("Deleted book"),
                        "404": error_response("Book not found", "ErrorResponse"),
                        "500": error_response("Store failure", "StoreErrorResponse")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "genre": { "type": "string" },
                        "publicationYear": { "type": "integer" },
                        "imageUrl": { "type": "string" },
                        "isbn": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["id", "title", "author"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "genre": { "type": "string" },
                        "publicationYear": { "type": "integer" },
                        "imageUrl": { "type": "string" },
                        "isbn": { "type": "string", "description": "ISBN-10 or ISBN-13" },
                        "description": { "type": "string" }
                    },
                    "required": ["title", "author"]
                },
                "UpdateBook": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "genre": { "type": "string" },
                        "publicationYear": { "type": "integer" },
                        "imageUrl": { "type": "string" },
                        "isbn": { "type": "string" },
                        "description": { "type": "string" }
                    }
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(
    store: Arc<dyn BookStore>,
    pagination: PaginationSettings,
    collection: impl Into<String>,
) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, pagination, collection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryBookStore;

    fn module() -> BooksModule {
        BooksModule::new(
            Arc::new(InMemoryBookStore::new()),
            PaginationSettings::default(),
            "library",
        )
    }

    #[test]
    fn index_migration_targets_configured_collection() {
        let migrations = module().migrations();
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].command["createIndexes"], "library");
        assert_eq!(migrations[0].command["indexes"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn openapi_fragment_documents_every_operation() {
        let spec = module().openapi().unwrap();
        for (path, method) in [
            ("/", "get"),
            ("/", "post"),
            ("/{id}", "get"),
            ("/{id}", "put"),
            ("/{id}", "delete"),
        ] {
            assert!(spec["paths"][path][method].is_object(), "{} {}", method, path);
        }
        assert!(spec["components"]["schemas"]["Book"].is_object());
    }
}
