//! PostgreSQL implementation of IssueRepository
//!
//! 借出与归还是读-改-写竞态的高发点，两者都在单个事务内
//! 以条件更新完成裁决：先读后写的检查只能提示，提交时刻
//! rows_affected 为 0 才是最终答案

use async_trait::async_trait;
use campus_adapter_postgres::with_db_retry;
use campus_common::retry::RetryConfig;
use campus_common::{BookId, IssueId, PagedResult, Pagination, StudentId, UserId};
use campus_errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::entities::{IssueRecord, IssueStatus, LoanPolicy};
use crate::domain::repositories::{CreateIssue, IssueRepository, ReturnIssue};
use crate::error::CirculationError;

use super::db_err;

const ISSUE_COLUMNS: &str = "id, book_id, student_id, issue_date, due_date, return_date, status, \
     created_at, created_by, updated_at, updated_by";

pub struct PostgresIssueRepository {
    pool: PgPool,
    retry: RetryConfig,
}

impl PostgresIssueRepository {
    pub fn new(pool: PgPool, retry: RetryConfig) -> Self {
        Self { pool, retry }
    }
}

#[async_trait]
impl IssueRepository for PostgresIssueRepository {
    async fn create(&self, event: CreateIssue, policy: &LoanPolicy) -> AppResult<IssueRecord> {
        debug!(
            book_id = %event.book_id,
            student_id = %event.student_id,
            "Issuing book"
        );

        // 变更事务不做重试：提交结果不明时重试会重复借出
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin issue transaction", e))?;

        // 1. 锁学生行，串行化同一学生的并发借出
        let student: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM students WHERE id = $1 FOR UPDATE")
                .bind(event.student_id.0)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_err("Failed to lock student row", e))?;
        if student.is_none() {
            return Err(CirculationError::StudentNotFound(event.student_id).into());
        }

        // 2. 在锁内统计在借数量并校验上限
        let open_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM issue_records WHERE student_id = $1 AND status = 'issued'",
        )
        .bind(event.student_id.0)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to count open issues", e))?;

        if open_count as u32 >= policy.max_books_per_student {
            return Err(CirculationError::BorrowingLimitReached {
                student_id: event.student_id,
                current: open_count as u32,
                max: policy.max_books_per_student,
            }
            .into());
        }

        // 3. 条件递减副本数；0 行受影响说明无可借副本或图书不存在
        let decremented = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1, updated_at = NOW()
            WHERE id = $1 AND available_copies > 0
            "#,
        )
        .bind(event.book_id.0)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to decrement available copies", e))?;

        if decremented.rows_affected() == 0 {
            let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM books WHERE id = $1")
                .bind(event.book_id.0)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_err("Failed to probe book existence", e))?;
            return if exists.is_some() {
                Err(CirculationError::NoCopiesAvailable(event.book_id).into())
            } else {
                Err(CirculationError::BookNotFound(event.book_id).into())
            };
        }

        // 4. 落库借阅记录
        let record = IssueRecord::new_issued(
            event.book_id,
            event.student_id,
            event.issue_date,
            event.due_date,
            event.issued_by,
        );

        sqlx::query(
            r#"
            INSERT INTO issue_records (id, book_id, student_id, issue_date, due_date,
                                       return_date, status, created_at, created_by,
                                       updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.0)
        .bind(record.book_id.0)
        .bind(record.student_id.0)
        .bind(record.issue_date)
        .bind(record.due_date)
        .bind(record.return_date)
        .bind(record.status.as_str())
        .bind(record.audit.created_at)
        .bind(record.audit.created_by.map(|u| u.0))
        .bind(record.audit.updated_at)
        .bind(record.audit.updated_by.map(|u| u.0))
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to insert issue record", e))?;

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit issue transaction", e))?;

        Ok(record)
    }

    async fn mark_returned(&self, event: ReturnIssue) -> AppResult<IssueRecord> {
        debug!(issue_id = %event.issue_id, "Returning book");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin return transaction", e))?;

        // 条件更新即裁决：只有在借状态的记录能被归还
        let row: Option<IssueRow> = sqlx::query_as(&format!(
            r#"
            UPDATE issue_records
            SET status = 'returned', return_date = $2, updated_at = NOW(), updated_by = $3
            WHERE id = $1 AND status = 'issued'
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        ))
        .bind(event.issue_id.0)
        .bind(event.return_date)
        .bind(event.returned_by.map(|u| u.0))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to mark issue returned", e))?;

        let row = match row {
            Some(row) => row,
            None => {
                // 区分重复归还与记录不存在
                let status: Option<(String,)> =
                    sqlx::query_as("SELECT status FROM issue_records WHERE id = $1")
                        .bind(event.issue_id.0)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(|e| db_err("Failed to probe issue status", e))?;
                return if status.is_some() {
                    Err(CirculationError::AlreadyReturned(event.issue_id).into())
                } else {
                    Err(CirculationError::IssueNotFound(event.issue_id).into())
                };
            }
        };

        // 副本数回补；上界由条件守住，不会超过馆藏总数
        let incremented = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies + 1, updated_at = NOW()
            WHERE id = $1 AND available_copies < total_copies
            "#,
        )
        .bind(row.book_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to increment available copies", e))?;

        if incremented.rows_affected() == 0 {
            warn!(
                book_id = %row.book_id,
                issue_id = %event.issue_id,
                "Available copies already at total, skipping increment"
            );
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit return transaction", e))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &IssueId) -> AppResult<Option<IssueRecord>> {
        let row = with_db_retry(&self.retry, "issue_find_by_id", || async {
            sqlx::query_as::<_, IssueRow>(&format!(
                "SELECT {} FROM issue_records WHERE id = $1",
                ISSUE_COLUMNS
            ))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("Failed to find issue record", e))
        })
        .await?;

        row.map(IssueRecord::try_from).transpose()
    }

    async fn count_open_by_student(&self, student_id: &StudentId) -> AppResult<u32> {
        let count: i64 = with_db_retry(&self.retry, "issue_count_open", || async {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM issue_records WHERE student_id = $1 AND status = 'issued'",
            )
            .bind(student_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_err("Failed to count open issues", e))
        })
        .await?;

        Ok(count as u32)
    }

    async fn find_open_by_student(&self, student_id: &StudentId) -> AppResult<Vec<IssueRecord>> {
        let rows = with_db_retry(&self.retry, "issue_find_open", || async {
            sqlx::query_as::<_, IssueRow>(&format!(
                "SELECT {} FROM issue_records \
                 WHERE student_id = $1 AND status = 'issued' ORDER BY due_date",
                ISSUE_COLUMNS
            ))
            .bind(student_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_err("Failed to list open issues", e))
        })
        .await?;

        rows.into_iter().map(IssueRecord::try_from).collect()
    }

    async fn find_history_by_book(
        &self,
        book_id: &BookId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<IssueRecord>> {
        let rows = with_db_retry(&self.retry, "issue_history", || async {
            sqlx::query_as::<_, IssueRow>(&format!(
                "SELECT {} FROM issue_records \
                 WHERE book_id = $1 ORDER BY issue_date DESC, created_at DESC \
                 LIMIT $2 OFFSET $3",
                ISSUE_COLUMNS
            ))
            .bind(book_id.0)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_err("Failed to list issue history", e))
        })
        .await?;

        let total: i64 = with_db_retry(&self.retry, "issue_history_count", || async {
            sqlx::query_scalar("SELECT COUNT(*) FROM issue_records WHERE book_id = $1")
                .bind(book_id.0)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_err("Failed to count issue history", e))
        })
        .await?;

        let records = rows
            .into_iter()
            .map(IssueRecord::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PagedResult::new(records, total as u64, pagination))
    }
}

#[derive(sqlx::FromRow)]
struct IssueRow {
    id: Uuid,
    book_id: Uuid,
    student_id: Uuid,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    return_date: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl TryFrom<IssueRow> for IssueRecord {
    type Error = AppError;

    fn try_from(row: IssueRow) -> Result<Self, Self::Error> {
        let status = IssueStatus::parse(&row.status).ok_or_else(|| {
            AppError::internal(format!("Unknown issue status in storage: {}", row.status))
        })?;

        Ok(IssueRecord {
            id: IssueId::from_uuid(row.id),
            book_id: BookId::from_uuid(row.book_id),
            student_id: StudentId::from_uuid(row.student_id),
            issue_date: row.issue_date,
            due_date: row.due_date,
            return_date: row.return_date,
            status,
            audit: campus_common::AuditInfo {
                created_at: row.created_at,
                created_by: row.created_by.map(UserId::from_uuid),
                updated_at: row.updated_at,
                updated_by: row.updated_by.map(UserId::from_uuid),
            },
        })
    }
}
