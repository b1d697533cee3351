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
    extractor::{json::ApiJson, validated::Validated},
    model::Book,
    state::ApiState,
};

#[derive(Debug, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct CreateBookResponse {
    pub book: Book,
}

impl IntoResponse for CreateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

/// POST / bookData => {book: newBook}
#[utoipa::path(
    post,
    path = "/books",
    request_body = Book,
    responses(
        (status = 201, description = "The persisted book", body = CreateBookResponse),
        (status = 400, description = "Payload failed schema validation", body = ApiErrorResponse),
        (status = 409, description = "A book with this isbn already exists", body = ApiErrorResponse),
    ),
    tag = "books"
)]
pub async fn create_book(
    State(state): State<ApiState>,
    Validated(ApiJson(book)): Validated<ApiJson<Book>>,
) -> Result<CreateBookResponse, ApiError> {
    let book = state.repository().create(&book).await?;

    Ok(CreateBookResponse { book })
}
