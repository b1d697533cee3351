use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use serde::Serialize;
use utoipa::ToSchema;

use crate::repository::RepositoryError;

/// The uniform error body: `{"error": {"message": ..., "status": ...}}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    message: ErrorMessage,
    status: u16,
}

/// A single message, or the full list of violated constraints for
/// validation failures.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    List(Vec<String>),
}

#[derive(Debug, From)]
/// API error
pub enum ApiError {
    /// Validation error
    ///
    /// This error is returned when the request body fails schema validation.
    Validation(ValidationError),
    /// Body error
    ///
    /// This error is returned when the body is not as expected.
    Body(BodyError),
    /// Query error
    ///
    /// This error is returned when the query parameters are not as expected.
    Query(QueryError),
    /// Path error
    ///
    /// This error is returned when the path is not as expected.
    Path(PathError),
    /// Not found error
    ///
    /// This error is returned when the requested resource is not found.
    NotFound(NotFoundError),
    /// Conflict error
    ///
    /// This error is returned when a create collides with an existing primary key.
    Conflict(ConflictError),
    /// Method not allowed
    ///
    /// This error is returned when the method is not allowed.
    MethodNotAllowed(MethodNotAllowedError),
    /// Internal server error
    ///
    /// This error is returned when an internal server error occurs.
    InternalServerError(InternalServerError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(err) => err.status_code(),
            ApiError::Body(err) => err.status_code(),
            ApiError::Query(err) => err.status_code(),
            ApiError::Path(err) => err.status_code(),
            ApiError::NotFound(err) => err.status_code(),
            ApiError::Conflict(err) => err.status_code(),
            ApiError::MethodNotAllowed(err) => err.status_code(),
            ApiError::InternalServerError(err) => err.status_code(),
        }
    }

    fn into_message(self) -> ErrorMessage {
        match self {
            ApiError::Validation(err) => ErrorMessage::List(err.messages),
            ApiError::Body(err) => {
                ErrorMessage::Single(format!("Failed to parse request body: {}", err.reason))
            }
            ApiError::Query(err) => ErrorMessage::Single(format!(
                "Failed to parse query parameters: {}",
                err.reason
            )),
            ApiError::Path(err) => {
                ErrorMessage::Single(format!("Failed to parse path parameters: {}", err.reason))
            }
            ApiError::NotFound(err) => ErrorMessage::Single(err.message),
            ApiError::Conflict(err) => ErrorMessage::Single(format!(
                "A book with isbn '{}' already exists",
                err.isbn
            )),
            ApiError::MethodNotAllowed(_) => {
                ErrorMessage::Single(String::from("Method not allowed"))
            }
            ApiError::InternalServerError(_) => {
                ErrorMessage::Single(String::from("An internal server error has occurred"))
            }
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        let status = error.status_code();

        ApiErrorResponse {
            error: ApiErrorBody {
                message: error.into_message(),
                status: status.as_u16(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        (status_code, Json(ApiErrorResponse::from(self))).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { isbn } => NotFoundError::book(&isbn).into(),
            RepositoryError::Duplicate { isbn } => ConflictError::new(isbn).into(),
            RepositoryError::Database(err) => InternalServerError::from_generic_error(err).into(),
        }
    }
}

#[derive(Debug)]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    /// Flattens [`validator::ValidationErrors`] into an ordered list of
    /// `field: message` descriptions.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: violates '{}'", error.code),
                })
            })
            .collect();

        // field_errors is a HashMap, sort for a stable response
        messages.sort();

        ValidationError { messages }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug)]
pub struct BodyError {
    reason: String,
}

impl BodyError {
    pub fn new(reason: String) -> Self {
        BodyError { reason }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug)]
pub struct QueryError {
    reason: String,
}

impl QueryError {
    pub fn new(reason: String) -> Self {
        QueryError { reason }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug)]
pub struct PathError {
    reason: String,
}

impl PathError {
    pub fn new(reason: String) -> Self {
        PathError { reason }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug)]
pub struct NotFoundError {
    message: String,
}

impl NotFoundError {
    /// A missing book, identified by its isbn.
    pub fn book(isbn: &str) -> Self {
        NotFoundError {
            message: format!("No book found with isbn: {isbn}"),
        }
    }

    /// A request that matched no route at all.
    pub fn resource() -> Self {
        NotFoundError {
            message: String::from("The requested resource was not found"),
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
}

#[derive(Debug)]
pub struct ConflictError {
    isbn: String,
}

impl ConflictError {
    pub fn new(isbn: String) -> Self {
        ConflictError { isbn }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::CONFLICT
    }
}

#[derive(Debug)]
pub struct MethodNotAllowedError {}

impl MethodNotAllowedError {
    pub fn new() -> Self {
        MethodNotAllowedError {}
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::METHOD_NOT_ALLOWED
    }
}

#[derive(Debug)]
pub struct InternalServerError {}

impl InternalServerError {
    pub fn from_generic_error<E: Into<anyhow::Error>>(err: E) -> Self {
        let err: anyhow::Error = err.into();
        let err = format!("{err:#}");
        tracing::error!(%err, "Internal server error");

        InternalServerError {}
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
