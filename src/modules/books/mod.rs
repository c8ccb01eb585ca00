pub mod models;
pub mod repository;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use bookstore_db::Database;
use bookstore_kernel::{InitCtx, Migration, Module};

use repository::BookRepository;

/// The catalog: CRUD over book records held in the document store.
pub struct BooksModule {
    repository: BookRepository,
}

impl BooksModule {
    pub fn new(db: &Database) -> Self {
        Self {
            repository: BookRepository::new(db),
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
            collection = repository::COLLECTION,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_books_title_idx",
            // language=postgresql
            up: r#"
                CREATE INDEX IF NOT EXISTS documents_books_title_idx
                ON documents ((body ->> 'title'))
                WHERE collection = 'books'
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let count = self.repository.list().await?.len();
        tracing::info!(module = self.name(), books = count, "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn openapi() -> serde_json::Value {
    let book_ref = serde_json::json!({ "$ref": "#/components/schemas/Book" });
    let input_body = serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    });
    let id_param = serde_json::json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    }]);

    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("All books with their count", &serde_json::json!({
                            "$ref": "#/components/schemas/BookList"
                        })),
                        "500": error_response("Store error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": input_body,
                    "responses": {
                        "201": json_response("Created book", &book_ref),
                        "400": error_response("Missing field or malformed body"),
                        "500": error_response("Store error")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": id_param,
                    "responses": {
                        "200": json_response("The book", &book_ref),
                        "404": error_response("No book with this id"),
                        "500": error_response("Store error")
                    }
                },
                "put": {
                    "summary": "Replace a book's title, author, and publish year",
                    "tags": ["Books"],
                    "parameters": id_param,
                    "requestBody": input_body,
                    "responses": {
                        "200": json_response("Updated book", &book_ref),
                        "400": error_response("Missing field or malformed body"),
                        "404": error_response("No book with this id"),
                        "500": error_response("Store error")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": id_param,
                    "responses": {
                        "200": json_response("Deletion confirmation", &serde_json::json!({
                            "$ref": "#/components/schemas/Deleted"
                        })),
                        "404": error_response("No book with this id"),
                        "500": error_response("Store error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Store-assigned identifier" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "publishYear": { "type": "integer", "format": "int32" },
                        "createdAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "title", "author", "publishYear", "createdAt", "updatedAt"]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "author": { "type": "string", "minLength": 1 },
                        "publishYear": { "type": "integer", "format": "int32" }
                    },
                    "required": ["title", "author", "publishYear"]
                },
                "BookList": {
                    "type": "object",
                    "properties": {
                        "count": { "type": "integer" },
                        "data": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                    },
                    "required": ["count", "data"]
                },
                "Deleted": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "id": { "type": "string" }
                    },
                    "required": ["message", "id"]
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(db: &Database) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(db))
}
