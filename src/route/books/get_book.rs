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
    model::Book,
    state::ApiState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetBookPath {
    pub isbn: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct GetBookResponse {
    pub book: Book,
}

impl IntoResponse for GetBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// GET /[isbn] => {book: book}
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Primary key of the book")),
    responses(
        (status = 200, description = "The requested book", body = GetBookResponse),
        (status = 404, description = "No book with this isbn", body = ApiErrorResponse),
    ),
    tag = "books"
)]
pub async fn get_book(
    State(state): State<ApiState>,
    ApiPath(path): ApiPath<GetBookPath>,
) -> Result<GetBookResponse, ApiError> {
    let book = state.repository().find_one(&path.isbn).await?;

    Ok(GetBookResponse { book })
}
