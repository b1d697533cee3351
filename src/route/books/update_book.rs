use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiErrorResponse},
    extractor::{json::ApiJson, path::ApiPath, validated::Validated},
    model::{Book, BookUpdate},
    state::ApiState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateBookPath {
    pub isbn: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct UpdateBookResponse {
    pub book: Book,
}

impl IntoResponse for UpdateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// PUT /[isbn] bookData => {book: updatedBook}
///
/// The isbn is taken from the path only; the body carries the mutable fields
/// and is validated on its own.
#[utoipa::path(
    put,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Primary key of the book")),
    request_body = BookUpdate,
    responses(
        (status = 200, description = "The updated book", body = UpdateBookResponse),
        (status = 400, description = "Payload failed schema validation", body = ApiErrorResponse),
        (status = 404, description = "No book with this isbn", body = ApiErrorResponse),
    ),
    tag = "books"
)]
pub async fn update_book(
    State(state): State<ApiState>,
    ApiPath(path): ApiPath<UpdateBookPath>,
    Validated(ApiJson(payload)): Validated<ApiJson<BookUpdate>>,
) -> Result<UpdateBookResponse, ApiError> {
    let book = state.repository().update(&path.isbn, &payload).await?;

    Ok(UpdateBookResponse { book })
}
