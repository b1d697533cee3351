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
    extractor::path::ApiPath,
    state::ApiState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteBookPath {
    pub isbn: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct DeleteBookResponse {
    pub message: String,
}

impl IntoResponse for DeleteBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// DELETE /[isbn] => {message: "Book deleted"}
#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Primary key of the book")),
    responses(
        (status = 200, description = "The book was deleted", body = DeleteBookResponse),
        (status = 404, description = "No book with this isbn", body = ApiErrorResponse),
    ),
    tag = "books"
)]
pub async fn delete_book(
    State(state): State<ApiState>,
    ApiPath(path): ApiPath<DeleteBookPath>,
) -> Result<DeleteBookResponse, ApiError> {
    state.repository().remove(&path.isbn).await?;

    Ok(DeleteBookResponse {
        message: String::from("Book deleted"),
    })
}
