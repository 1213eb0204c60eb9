//! 流通业务错误

use campus_common::{BookId, IssueId, StudentId};
use campus_errors::AppError;
use chrono::NaiveDate;
use thiserror::Error;

/// 流通域错误
///
/// 在持久层/应用层产生，出站前统一映射为 AppError
#[derive(Debug, Error)]
pub enum CirculationError {
    #[error("book {0} not found")]
    BookNotFound(BookId),

    #[error("student {0} not found")]
    StudentNotFound(StudentId),

    #[error("issue record {0} not found")]
    IssueNotFound(IssueId),

    #[error("no copies available for book {0}")]
    NoCopiesAvailable(BookId),

    #[error("borrowing limit reached for student {student_id}: {current}/{max} books issued")]
    BorrowingLimitReached {
        student_id: StudentId,
        current: u32,
        max: u32,
    },

    #[error("issue record {0} already returned")]
    AlreadyReturned(IssueId),

    #[error("return date {return_date} precedes issue date {issue_date}")]
    ReturnBeforeIssue {
        issue_date: NaiveDate,
        return_date: NaiveDate,
    },

    #[error("no loan policy configured")]
    PolicyNotConfigured,
}

impl From<CirculationError> for AppError {
    fn from(err: CirculationError) -> Self {
        match &err {
            CirculationError::BookNotFound(_)
            | CirculationError::StudentNotFound(_)
            | CirculationError::IssueNotFound(_) => AppError::not_found(err.to_string()),
            CirculationError::NoCopiesAvailable(_)
            | CirculationError::BorrowingLimitReached { .. } => {
                AppError::failed_precondition(err.to_string())
            }
            CirculationError::AlreadyReturned(_) => AppError::conflict(err.to_string()),
            CirculationError::ReturnBeforeIssue { .. } => AppError::validation(err.to_string()),
            CirculationError::PolicyNotConfigured => AppError::failed_precondition(err.to_string()),
        }
    }
}

pub type CirculationResult<T> = Result<T, CirculationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_matches_error_taxonomy() {
        let err: AppError = CirculationError::BookNotFound(BookId::new()).into();
        assert_eq!(err.status_code(), 404);

        let err: AppError = CirculationError::NoCopiesAvailable(BookId::new()).into();
        assert_eq!(err.status_code(), 412);

        let err: AppError = CirculationError::BorrowingLimitReached {
            student_id: StudentId::new(),
            current: 3,
            max: 3,
        }
        .into();
        assert_eq!(err.status_code(), 412);

        let err: AppError = CirculationError::AlreadyReturned(IssueId::new()).into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = CirculationError::ReturnBeforeIssue {
            issue_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
        .into();
        assert_eq!(err.status_code(), 400);
    }
}
