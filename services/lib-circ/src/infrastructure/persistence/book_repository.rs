//! PostgreSQL implementation of BookRepository

use async_trait::async_trait;
use campus_adapter_postgres::with_db_retry;
use campus_common::retry::RetryConfig;
use campus_common::{AuditInfo, BookId, PagedResult, Pagination, UserId};
use campus_errors::AppResult;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::Book;
use crate::domain::repositories::BookRepository;
use crate::domain::value_objects::Isbn;

use super::db_err;

const BOOK_COLUMNS: &str = "id, title, author, isbn, total_copies, available_copies, \
     created_at, created_by, updated_at, updated_by";

pub struct PostgresBookRepository {
    pool: PgPool,
    retry: RetryConfig,
}

impl PostgresBookRepository {
    pub fn new(pool: PgPool, retry: RetryConfig) -> Self {
        Self { pool, retry }
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    async fn find_by_id(&self, id: &BookId) -> AppResult<Option<Book>> {
        debug!("Finding book by id: {}", id);

        let row = with_db_retry(&self.retry, "book_find_by_id", || async {
            sqlx::query_as::<_, BookRow>(&format!(
                "SELECT {} FROM books WHERE id = $1",
                BOOK_COLUMNS
            ))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to find book", e))
        })
        .await?;

        row.map(Book::try_from).transpose()
    }

    async fn save(&self, book: &Book) -> AppResult<()> {
        debug!("Saving book: {}", book.id);

        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, isbn, total_copies, available_copies,
                               created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                author = EXCLUDED.author,
                isbn = EXCLUDED.isbn,
                total_copies = EXCLUDED.total_copies,
                available_copies = EXCLUDED.available_copies,
                updated_at = EXCLUDED.updated_at,
                updated_by = EXCLUDED.updated_by
            "#,
        )
        .bind(book.id.0)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.isbn.as_str())
        .bind(book.total_copies as i32)
        .bind(book.available_copies as i32)
        .bind(book.audit.created_at)
        .bind(book.audit.created_by.map(|u| u.0))
        .bind(book.audit.updated_at)
        .bind(book.audit.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to save book", e))?;

        Ok(())
    }

    async fn find_all(&self, pagination: &Pagination) -> AppResult<PagedResult<Book>> {
        let rows = with_db_retry(&self.retry, "book_find_all", || async {
            sqlx::query_as::<_, BookRow>(&format!(
                "SELECT {} FROM books ORDER BY title LIMIT $1 OFFSET $2",
                BOOK_COLUMNS
            ))
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_err("Failed to list books", e))
        })
        .await?;

        let total: i64 = with_db_retry(&self.retry, "book_count", || async {
            sqlx::query_scalar("SELECT COUNT(*) FROM books")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_err("Failed to count books", e))
        })
        .await?;

        let books = rows
            .into_iter()
            .map(Book::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PagedResult::new(books, total as u64, pagination))
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author: String,
    isbn: String,
    total_copies: i32,
    available_copies: i32,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl TryFrom<BookRow> for Book {
    type Error = campus_errors::AppError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Book::from_parts(
            BookId::from_uuid(row.id),
            row.title,
            row.author,
            Isbn::new(row.isbn)?,
            row.total_copies as u32,
            row.available_copies as u32,
            AuditInfo {
                created_at: row.created_at,
                created_by: row.created_by.map(UserId::from_uuid),
                updated_at: row.updated_at,
                updated_by: row.updated_by.map(UserId::from_uuid),
            },
        )
    }
}
