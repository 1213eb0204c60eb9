//! 借出处理器

use std::sync::Arc;

use async_trait::async_trait;
use campus_cqrs_core::CommandHandler;
use campus_errors::AppResult;
use metrics::counter;
use tracing::info;

use crate::application::commands::IssueBookCommand;
use crate::domain::entities::IssueRecord;
use crate::domain::repositories::{CreateIssue, IssueRepository, LoanPolicyRepository};
use crate::domain::services::LoanPolicyEvaluator;
use crate::error::CirculationError;

/// 借出处理器
pub struct IssueBookHandler {
    issue_repo: Arc<dyn IssueRepository>,
    policy_repo: Arc<dyn LoanPolicyRepository>,
}

impl IssueBookHandler {
    pub fn new(
        issue_repo: Arc<dyn IssueRepository>,
        policy_repo: Arc<dyn LoanPolicyRepository>,
    ) -> Self {
        Self {
            issue_repo,
            policy_repo,
        }
    }
}

#[async_trait]
impl CommandHandler<IssueBookCommand> for IssueBookHandler {
    async fn handle(&self, command: IssueBookCommand) -> AppResult<IssueRecord> {
        info!(
            book_id = %command.book_id,
            student_id = %command.student_id,
            issue_date = %command.issue_date,
            "Handling IssueBook command"
        );

        // 1. 读取当前策略快照（显式传递，不走全局状态）
        let policy = self
            .policy_repo
            .get()
            .await?
            .ok_or(CirculationError::PolicyNotConfigured)?;

        // 2. 按快照计算应还日期；落库后策略变更不再影响该记录
        let due_date = LoanPolicyEvaluator::due_date(&policy, command.issue_date);

        // 3. 借出事务：副本扣减与上限校验由存储侧在同一事务内裁决
        let record = self
            .issue_repo
            .create(
                CreateIssue {
                    book_id: command.book_id,
                    student_id: command.student_id,
                    issue_date: command.issue_date,
                    due_date,
                    issued_by: command.issued_by,
                },
                &policy,
            )
            .await
            .inspect_err(|_| {
                counter!("circulation_issue_failures_total").increment(1);
            })?;

        counter!("circulation_issues_total").increment(1);
        info!(
            issue_id = %record.id,
            due_date = %record.due_date,
            "Book issued"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{IssueStatus, LoanPolicy};
    use crate::domain::repositories::{MockIssueRepository, MockLoanPolicyRepository};
    use campus_common::{BookId, StudentId};
    use campus_domain_core::Money;
    use campus_errors::AppError;
    use chrono::NaiveDate;

    fn policy() -> LoanPolicy {
        LoanPolicy::new(3, 14, Money::inr(10), None).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn command() -> IssueBookCommand {
        IssueBookCommand {
            book_id: BookId::new(),
            student_id: StudentId::new(),
            issue_date: date(2025, 1, 1),
            issued_by: None,
        }
    }

    #[tokio::test]
    async fn issues_with_due_date_from_policy_snapshot() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo
            .expect_get()
            .returning(|| Ok(Some(policy())));

        let mut issue_repo = MockIssueRepository::new();
        issue_repo.expect_create().returning(|event, _policy| {
            Ok(IssueRecord::new_issued(
                event.book_id,
                event.student_id,
                event.issue_date,
                event.due_date,
                event.issued_by,
            ))
        });

        let handler = IssueBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let record = handler.handle(command()).await.unwrap();

        assert_eq!(record.issue_date, date(2025, 1, 1));
        assert_eq!(record.due_date, date(2025, 1, 15));
        assert_eq!(record.status, IssueStatus::Issued);
        assert!(record.return_date.is_none());
    }

    #[tokio::test]
    async fn missing_policy_blocks_issue() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo.expect_get().returning(|| Ok(None));

        // create 不应被调用；未设置期望的 mock 方法被调用时会 panic
        let issue_repo = MockIssueRepository::new();

        let handler = IssueBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let err = handler.handle(command()).await.unwrap_err();
        assert_eq!(err.status_code(), 412);
    }

    #[tokio::test]
    async fn no_copies_failure_propagates_without_creating_record() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo
            .expect_get()
            .returning(|| Ok(Some(policy())));

        let mut issue_repo = MockIssueRepository::new();
        issue_repo.expect_create().returning(|event, _| {
            Err(CirculationError::NoCopiesAvailable(event.book_id).into())
        });

        let handler = IssueBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let err = handler.handle(command()).await.unwrap_err();
        assert_eq!(err.status_code(), 412);
        assert!(err.to_string().contains("no copies available"));
    }

    #[tokio::test]
    async fn borrowing_limit_failure_propagates() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo
            .expect_get()
            .returning(|| Ok(Some(policy())));

        let mut issue_repo = MockIssueRepository::new();
        issue_repo.expect_create().returning(|event, policy| {
            Err(CirculationError::BorrowingLimitReached {
                student_id: event.student_id,
                current: policy.max_books_per_student,
                max: policy.max_books_per_student,
            }
            .into())
        });

        let handler = IssueBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let err = handler.handle(command()).await.unwrap_err();
        assert_eq!(err.status_code(), 412);
        assert!(err.to_string().contains("borrowing limit reached"));
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_database_error() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo
            .expect_get()
            .returning(|| Err(AppError::database("connection refused")));

        let issue_repo = MockIssueRepository::new();
        let handler = IssueBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let err = handler.handle(command()).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
