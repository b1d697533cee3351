use sqlx::{PgPool, QueryBuilder};

use crate::model::{Book, BookFilters, BookUpdate};

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("no book found with isbn: {isbn}")]
    NotFound { isbn: String },

    #[error("a book with isbn '{isbn}' already exists")]
    Duplicate { isbn: String },

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

/// Data access for the `books` table. Every operation is a single SQL
/// statement, no explicit transactions.
#[derive(Clone)]
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns all books matching the given filters, ordered by title.
    /// An empty table yields an empty vec, not an error.
    pub async fn find_all(&self, filters: &BookFilters) -> Result<Vec<Book>, RepositoryError> {
        let mut query =
            QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books WHERE 1 = 1"));

        if let Some(author) = &filters.author {
            query.push(" AND author = ").push_bind(author);
        }

        if let Some(language) = &filters.language {
            query.push(" AND language = ").push_bind(language);
        }

        if let Some(year) = filters.year {
            query.push(" AND year = ").push_bind(year);
        }

        query.push(" ORDER BY title");

        let books = query
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    pub async fn find_one(&self, isbn: &str) -> Result<Book, RepositoryError> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE isbn = $1"
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            isbn: isbn.to_owned(),
        })
    }

    pub async fn create(&self, book: &Book) -> Result<Book, RepositoryError> {
        sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books ({BOOK_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Duplicate {
                    isbn: book.isbn.clone(),
                }
            }
            _ => RepositoryError::Database(err),
        })
    }

    pub async fn update(&self, isbn: &str, book: &BookUpdate) -> Result<Book, RepositoryError> {
        sqlx::query_as::<_, Book>(&format!(
            "UPDATE books \
             SET amazon_url = $2, author = $3, language = $4, pages = $5, \
                 publisher = $6, title = $7, year = $8 \
             WHERE isbn = $1 \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            isbn: isbn.to_owned(),
        })
    }

    pub async fn remove(&self, isbn: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                isbn: isbn.to_owned(),
            });
        }

        Ok(())
    }
}
