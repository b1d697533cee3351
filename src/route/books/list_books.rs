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
    error::ApiError,
    extractor::query::ApiQuery,
    model::{Book, BookFilters},
    state::ApiState,
};

#[derive(Debug, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct ListBooksResponse {
    pub books: Vec<Book>,
}

impl IntoResponse for ListBooksResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// GET / => {books: [book, ...]}
#[utoipa::path(
    get,
    path = "/books",
    params(BookFilters),
    responses(
        (status = 200, description = "All books matching the optional filters", body = ListBooksResponse),
    ),
    tag = "books"
)]
pub async fn list_books(
    State(state): State<ApiState>,
    ApiQuery(filters): ApiQuery<BookFilters>,
) -> Result<ListBooksResponse, ApiError> {
    let books = state.repository().find_all(&filters).await?;

    Ok(ListBooksResponse { books })
}
