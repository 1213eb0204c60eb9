//! 归还处理器

use std::sync::Arc;

use async_trait::async_trait;
use campus_cqrs_core::CommandHandler;
use campus_errors::AppResult;
use metrics::counter;
use tracing::info;

use crate::application::commands::{CompletedReturn, ReturnBookCommand};
use crate::domain::repositories::{IssueRepository, LoanPolicyRepository, ReturnIssue};
use crate::domain::services::LoanPolicyEvaluator;
use crate::error::CirculationError;

/// 归还处理器
pub struct ReturnBookHandler {
    issue_repo: Arc<dyn IssueRepository>,
    policy_repo: Arc<dyn LoanPolicyRepository>,
}

impl ReturnBookHandler {
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
impl CommandHandler<ReturnBookCommand> for ReturnBookHandler {
    async fn handle(&self, command: ReturnBookCommand) -> AppResult<CompletedReturn> {
        info!(
            issue_id = %command.issue_id,
            return_date = %command.return_date,
            "Handling ReturnBook command"
        );

        // 1. 查找借阅记录
        let existing = self
            .issue_repo
            .find_by_id(&command.issue_id)
            .await?
            .ok_or(CirculationError::IssueNotFound(command.issue_id))?;

        // 2. 归还日期不得早于借出日期（支持补登历史归还）
        if command.return_date < existing.issue_date {
            return Err(CirculationError::ReturnBeforeIssue {
                issue_date: existing.issue_date,
                return_date: command.return_date,
            }
            .into());
        }

        // 3. 归还事务：status 条件更新保证重复归还不会二次加回副本
        let record = self
            .issue_repo
            .mark_returned(ReturnIssue {
                issue_id: command.issue_id,
                return_date: command.return_date,
                returned_by: command.returned_by,
            })
            .await
            .inspect_err(|_| {
                counter!("circulation_return_failures_total").increment(1);
            })?;

        // 4. 按当前策略评估罚金（派生值，不落库）
        let policy = self
            .policy_repo
            .get()
            .await?
            .ok_or(CirculationError::PolicyNotConfigured)?;
        let assessment =
            LoanPolicyEvaluator::assess_fine(&policy, record.issue_date, command.return_date);

        counter!("circulation_returns_total").increment(1);
        info!(
            issue_id = %record.id,
            overdue_days = assessment.overdue_days,
            fine_minor = assessment.fine.amount,
            "Book returned"
        );

        Ok(CompletedReturn { record, assessment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{IssueRecord, IssueStatus, LoanPolicy};
    use crate::domain::repositories::{MockIssueRepository, MockLoanPolicyRepository};
    use campus_common::{BookId, IssueId, StudentId};
    use campus_domain_core::Money;
    use chrono::NaiveDate;

    fn policy() -> LoanPolicy {
        LoanPolicy::new(3, 14, Money::inr(10), None).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open_record() -> IssueRecord {
        IssueRecord::new_issued(
            BookId::new(),
            StudentId::new(),
            date(2025, 1, 1),
            date(2025, 1, 15),
            None,
        )
    }

    #[tokio::test]
    async fn overdue_return_reports_accrued_fine() {
        let record = open_record();
        let issue_id = record.id;

        let mut issue_repo = MockIssueRepository::new();
        {
            let record = record.clone();
            issue_repo
                .expect_find_by_id()
                .returning(move |_| Ok(Some(record.clone())));
        }
        issue_repo.expect_mark_returned().returning(move |event| {
            let mut updated = record.clone();
            updated.mark_returned(event.return_date, event.returned_by)?;
            Ok(updated)
        });

        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo.expect_get().returning(|| Ok(Some(policy())));

        let handler = ReturnBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let completed = handler
            .handle(ReturnBookCommand {
                issue_id,
                return_date: date(2025, 1, 20),
                returned_by: None,
            })
            .await
            .unwrap();

        assert_eq!(completed.record.status, IssueStatus::Returned);
        assert_eq!(completed.record.return_date, Some(date(2025, 1, 20)));
        assert_eq!(completed.assessment.overdue_days, 5);
        assert_eq!(completed.assessment.fine, Money::inr(50));
    }

    #[tokio::test]
    async fn on_time_return_has_no_fine() {
        let record = open_record();
        let issue_id = record.id;

        let mut issue_repo = MockIssueRepository::new();
        {
            let record = record.clone();
            issue_repo
                .expect_find_by_id()
                .returning(move |_| Ok(Some(record.clone())));
        }
        issue_repo.expect_mark_returned().returning(move |event| {
            let mut updated = record.clone();
            updated.mark_returned(event.return_date, event.returned_by)?;
            Ok(updated)
        });

        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo.expect_get().returning(|| Ok(Some(policy())));

        let handler = ReturnBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let completed = handler
            .handle(ReturnBookCommand {
                issue_id,
                return_date: date(2025, 1, 10),
                returned_by: None,
            })
            .await
            .unwrap();

        assert_eq!(completed.assessment.overdue_days, 0);
        assert!(completed.assessment.fine.is_zero());
    }

    #[tokio::test]
    async fn unknown_issue_is_not_found() {
        let mut issue_repo = MockIssueRepository::new();
        issue_repo.expect_find_by_id().returning(|_| Ok(None));
        let policy_repo = MockLoanPolicyRepository::new();

        let handler = ReturnBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let err = handler
            .handle(ReturnBookCommand {
                issue_id: IssueId::new(),
                return_date: date(2025, 1, 10),
                returned_by: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn return_before_issue_date_is_rejected_before_any_write() {
        let record = open_record();
        let issue_id = record.id;

        let mut issue_repo = MockIssueRepository::new();
        issue_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(record.clone())));
        // mark_returned 不设期望：到达即 panic

        let policy_repo = MockLoanPolicyRepository::new();
        let handler = ReturnBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let err = handler
            .handle(ReturnBookCommand {
                issue_id,
                return_date: date(2024, 12, 31),
                returned_by: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn second_return_is_a_conflict() {
        let mut returned = open_record();
        returned
            .mark_returned(date(2025, 1, 10), None)
            .unwrap();
        let issue_id = returned.id;

        let mut issue_repo = MockIssueRepository::new();
        {
            let returned = returned.clone();
            issue_repo
                .expect_find_by_id()
                .returning(move |_| Ok(Some(returned.clone())));
        }
        issue_repo
            .expect_mark_returned()
            .returning(move |event| Err(CirculationError::AlreadyReturned(event.issue_id).into()));

        let policy_repo = MockLoanPolicyRepository::new();
        let handler = ReturnBookHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let err = handler
            .handle(ReturnBookCommand {
                issue_id,
                return_date: date(2025, 1, 12),
                returned_by: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }
}
