//! PostgreSQL 持久化实现

mod book_repository;
mod issue_repository;
mod loan_policy_repository;

pub use book_repository::PostgresBookRepository;
pub use issue_repository::PostgresIssueRepository;
pub use loan_policy_repository::PostgresLoanPolicyRepository;

use campus_errors::AppError;

/// sqlx 错误统一映射
pub(crate) fn db_err(context: &str, e: sqlx::Error) -> AppError {
    AppError::database(format!("{}: {}", context, e))
}
