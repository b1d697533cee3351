use axum::{body::Body, response::IntoResponse, Router};
use http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use validator::Validate;

use crate::{
    error::{ApiError, NotFoundError, ValidationError},
    model::{Book, BookUpdate},
    repository::{BookRepository, RepositoryError},
    server::{router, ServerConfig},
    state::ApiState,
};

fn test_book() -> Book {
    Book {
        isbn: String::from("0691161518"),
        amazon_url: String::from("http://a.co/eobPtX2"),
        author: String::from("Matthew Lane"),
        language: String::from("english"),
        pages: 264,
        publisher: String::from("Princeton University Press"),
        title: String::from("Power-Up: Unlocking the Hidden Mathematics in Video Games"),
        year: 2017,
    }
}

fn app(pool: PgPool) -> Router {
    router(ApiState::new(BookRepository::new(pool)))
}

async fn insert_test_book(pool: &PgPool) -> Book {
    BookRepository::new(pool.clone())
        .create(&test_book())
        .await
        .expect("Failed to insert test book")
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

#[tokio::test]
async fn example_config_is_valid() {
    ServerConfig::from_config_file("config.example.yaml")
        .await
        .expect("Example config is not parsable");
}

#[test]
fn valid_book_passes_validation() {
    test_book().validate().expect("Test book is not valid");
}

#[test]
fn book_with_invalid_url_fails_validation() {
    let book = Book {
        amazon_url: String::from("not a url"),
        ..test_book()
    };

    let errors = book.validate().expect_err("Invalid URL was accepted");
    let validation_error = ValidationError::from_validation_errors(errors);

    let response = ApiError::from(validation_error).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validation_error_body_carries_message_list() {
    let book = Book {
        amazon_url: String::from("not a url"),
        pages: 0,
        ..test_book()
    };

    let errors = book.validate().expect_err("Invalid book was accepted");
    let response =
        ApiError::from(ValidationError::from_validation_errors(errors)).into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["status"], json!(400));

    let messages = body["error"]["message"]
        .as_array()
        .expect("Message is not a list");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], json!("amazon_url: Must be a valid URL"));
    assert_eq!(messages[1], json!("pages: Must be at least 1"));
}

#[tokio::test]
async fn not_found_error_body_has_uniform_shape() {
    let response = ApiError::NotFound(NotFoundError::book("0691161518")).into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(
        body,
        json!({
            "error": {
                "message": "No book found with isbn: 0691161518",
                "status": 404,
            }
        })
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn list_books_on_empty_table_returns_empty_list(pool: PgPool) {
    let response = app(pool)
        .oneshot(get_request("/books"))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "books": [] }));
}

#[sqlx::test(migrations = "./migrations")]
async fn list_books_returns_inserted_book(pool: PgPool) {
    let book = insert_test_book(&pool).await;

    let response = app(pool)
        .oneshot(get_request("/books"))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "books": [book] }));
}

#[sqlx::test(migrations = "./migrations")]
async fn list_books_filters_by_author(pool: PgPool) {
    insert_test_book(&pool).await;

    let other = Book {
        isbn: String::from("1234567890"),
        author: String::from("Other Author"),
        ..test_book()
    };
    BookRepository::new(pool.clone())
        .create(&other)
        .await
        .expect("Failed to insert second book");

    let response = app(pool)
        .oneshot(get_request("/books?author=Other%20Author"))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "books": [other] }));
}

#[sqlx::test(migrations = "./migrations")]
async fn get_book_returns_single_book(pool: PgPool) {
    let book = insert_test_book(&pool).await;

    let response = app(pool)
        .oneshot(get_request("/books/0691161518"))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "book": book }));
}

#[sqlx::test(migrations = "./migrations")]
async fn get_unknown_book_is_not_found(pool: PgPool) {
    let response = app(pool)
        .oneshot(get_request("/books/invalid"))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["error"]["status"], json!(404));
}

#[sqlx::test(migrations = "./migrations")]
async fn create_valid_book_persists(pool: PgPool) {
    let new_book = json!({
        "isbn": "1234567890",
        "amazon_url": "http://a.co/eobPtX2",
        "author": "New Author",
        "language": "english",
        "pages": 123,
        "publisher": "New Publisher",
        "title": "New Title",
        "year": 2021,
    });

    let response = app(pool.clone())
        .oneshot(json_request(Method::POST, "/books", &new_book))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response_json(response).await, json!({ "book": new_book }));

    let in_db = BookRepository::new(pool)
        .find_one("1234567890")
        .await
        .expect("Created book is not in the database");
    assert_eq!(serde_json::to_value(in_db).unwrap(), new_book);
}

#[sqlx::test(migrations = "./migrations")]
async fn create_with_wrong_typed_year_is_rejected(pool: PgPool) {
    let invalid_book = json!({
        "isbn": "1234567890",
        "amazon_url": "http://a.co/eobPtX2",
        "author": "New Author",
        "language": "english",
        "pages": 123,
        "publisher": "New Publisher",
        "title": "New Title",
        "year": "invalid year",
    });

    let response = app(pool)
        .oneshot(json_request(Method::POST, "/books", &invalid_book))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["status"], json!(400));
    assert!(body["error"]["message"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn create_with_invalid_url_is_rejected(pool: PgPool) {
    let invalid_book = json!({
        "isbn": "1234567890",
        "amazon_url": "not a url",
        "author": "New Author",
        "language": "english",
        "pages": 123,
        "publisher": "New Publisher",
        "title": "New Title",
        "year": 2021,
    });

    let response = app(pool)
        .oneshot(json_request(Method::POST, "/books", &invalid_book))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    let messages = body["error"]["message"]
        .as_array()
        .expect("Message is not a list");
    assert!(!messages.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn create_duplicate_isbn_conflicts(pool: PgPool) {
    let book = insert_test_book(&pool).await;

    let response = app(pool)
        .oneshot(json_request(
            Method::POST,
            "/books",
            &serde_json::to_value(&book).unwrap(),
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(body["error"]["status"], json!(409));
}

#[sqlx::test(migrations = "./migrations")]
async fn update_existing_book(pool: PgPool) {
    let book = insert_test_book(&pool).await;

    let update = json!({
        "amazon_url": "http://a.co/eobPtX2",
        "author": "Updated Author",
        "language": "english",
        "pages": 123,
        "publisher": "Updated Publisher",
        "title": "Updated Title",
        "year": 2020,
    });

    let response = app(pool.clone())
        .oneshot(json_request(
            Method::PUT,
            &format!("/books/{}", book.isbn),
            &update,
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);

    let mut expected = update.as_object().unwrap().clone();
    expected.insert(String::from("isbn"), json!(book.isbn));
    let expected = Value::Object(expected);

    assert_eq!(response_json(response).await, json!({ "book": expected }));

    let in_db = BookRepository::new(pool)
        .find_one(&book.isbn)
        .await
        .expect("Updated book is not in the database");
    assert_eq!(serde_json::to_value(in_db).unwrap(), expected);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_with_invalid_payload_is_rejected(pool: PgPool) {
    let book = insert_test_book(&pool).await;

    let invalid_update = json!({
        "amazon_url": "http://a.co/eobPtX2",
        "author": "Updated Author",
        "language": "english",
        "pages": 0,
        "publisher": "Updated Publisher",
        "title": "Updated Title",
        "year": 2020,
    });

    let response = app(pool)
        .oneshot(json_request(
            Method::PUT,
            &format!("/books/{}", book.isbn),
            &invalid_update,
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    let messages = body["error"]["message"]
        .as_array()
        .expect("Message is not a list");
    assert_eq!(messages[0], json!("pages: Must be at least 1"));
}

#[sqlx::test(migrations = "./migrations")]
async fn update_unknown_isbn_is_not_found(pool: PgPool) {
    let update = json!({
        "amazon_url": "http://a.co/eobPtX2",
        "author": "Updated Author",
        "language": "english",
        "pages": 123,
        "publisher": "Updated Publisher",
        "title": "Updated Title",
        "year": 2020,
    });

    let response = app(pool)
        .oneshot(json_request(Method::PUT, "/books/invalid", &update))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_book_removes_row(pool: PgPool) {
    let book = insert_test_book(&pool).await;

    let response = app(pool.clone())
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/books/{}", book.isbn))
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_json(response).await,
        json!({ "message": "Book deleted" })
    );

    let lookup = BookRepository::new(pool).find_one(&book.isbn).await;
    assert!(matches!(lookup, Err(RepositoryError::NotFound { .. })));
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_unknown_isbn_is_not_found(pool: PgPool) {
    let response = app(pool)
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/books/invalid")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_route_is_not_found(pool: PgPool) {
    let response = app(pool)
        .oneshot(get_request("/authors"))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(
        body["error"]["message"],
        json!("The requested resource was not found")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn wrong_method_on_books_is_method_not_allowed(pool: PgPool) {
    let response = app(pool)
        .oneshot(json_request(Method::PATCH, "/books", &json!({})))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[sqlx::test(migrations = "./migrations")]
async fn repository_find_all_on_empty_table_is_empty(pool: PgPool) {
    let books = BookRepository::new(pool)
        .find_all(&Default::default())
        .await
        .expect("find_all failed");

    assert!(books.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn repository_update_keeps_isbn(pool: PgPool) {
    let book = insert_test_book(&pool).await;

    let update = BookUpdate {
        amazon_url: book.amazon_url.clone(),
        author: String::from("Updated Author"),
        language: book.language.clone(),
        pages: book.pages,
        publisher: book.publisher.clone(),
        title: book.title.clone(),
        year: book.year,
    };

    let updated = BookRepository::new(pool)
        .update(&book.isbn, &update)
        .await
        .expect("update failed");

    assert_eq!(updated.isbn, book.isbn);
    assert_eq!(updated.author, "Updated Author");
}
