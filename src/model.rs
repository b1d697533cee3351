use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A row of the `books` table. `isbn` is the primary key, everything else is
/// mutable. The same shape is the create payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, JsonSchema, ToSchema, Validate)]
pub struct Book {
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub isbn: String,
    #[validate(url(message = "Must be a valid URL"))]
    pub amazon_url: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub language: String,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub pages: i32,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub publisher: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub title: String,
    #[validate(range(min = 0, max = 3000, message = "Must be between 0 and 3000"))]
    pub year: i32,
}

/// Update payload: every book field except `isbn`. The isbn comes from the
/// URL path and is never read from the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema, Validate)]
pub struct BookUpdate {
    #[validate(url(message = "Must be a valid URL"))]
    pub amazon_url: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub language: String,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub pages: i32,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub publisher: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub title: String,
    #[validate(range(min = 0, max = 3000, message = "Must be between 0 and 3000"))]
    pub year: i32,
}

/// Optional filter criteria accepted by the list endpoint.
#[derive(Debug, Default, Deserialize, JsonSchema, IntoParams)]
pub struct BookFilters {
    pub author: Option<String>,
    pub language: Option<String>,
    pub year: Option<i32>,
}
