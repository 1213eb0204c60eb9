//! 流通查询处理器

use std::sync::Arc;

use async_trait::async_trait;
use campus_common::PagedResult;
use campus_cqrs_core::QueryHandler;
use campus_errors::AppResult;
use tracing::debug;

use crate::application::queries::{
    CheckEligibilityQuery, GetLoanPolicyQuery, ListBookHistoryQuery, ListOpenIssuesQuery,
    PreviewFineQuery,
};
use crate::domain::entities::{IssueRecord, LoanPolicy};
use crate::domain::repositories::{BookRepository, IssueRepository, LoanPolicyRepository};
use crate::domain::services::{EligibilityStatus, FineAssessment, LoanPolicyEvaluator};
use crate::error::CirculationError;

/// 借阅资格查询处理器
pub struct CheckEligibilityHandler {
    issue_repo: Arc<dyn IssueRepository>,
    policy_repo: Arc<dyn LoanPolicyRepository>,
}

impl CheckEligibilityHandler {
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
impl QueryHandler<CheckEligibilityQuery> for CheckEligibilityHandler {
    async fn handle(&self, query: CheckEligibilityQuery) -> AppResult<EligibilityStatus> {
        debug!(student_id = %query.student_id, "Checking borrowing eligibility");

        let policy = self
            .policy_repo
            .get()
            .await?
            .ok_or(CirculationError::PolicyNotConfigured)?;
        let open_count = self
            .issue_repo
            .count_open_by_student(&query.student_id)
            .await?;

        Ok(LoanPolicyEvaluator::evaluate_eligibility(
            &policy, open_count,
        ))
    }
}

/// 罚金预览处理器
pub struct PreviewFineHandler {
    policy_repo: Arc<dyn LoanPolicyRepository>,
}

impl PreviewFineHandler {
    pub fn new(policy_repo: Arc<dyn LoanPolicyRepository>) -> Self {
        Self { policy_repo }
    }
}

#[async_trait]
impl QueryHandler<PreviewFineQuery> for PreviewFineHandler {
    async fn handle(&self, query: PreviewFineQuery) -> AppResult<FineAssessment> {
        let policy = self
            .policy_repo
            .get()
            .await?
            .ok_or(CirculationError::PolicyNotConfigured)?;

        Ok(LoanPolicyEvaluator::assess_fine(
            &policy,
            query.issue_date,
            query.candidate_return_date,
        ))
    }
}

/// 当前策略查询处理器
pub struct GetLoanPolicyHandler {
    policy_repo: Arc<dyn LoanPolicyRepository>,
}

impl GetLoanPolicyHandler {
    pub fn new(policy_repo: Arc<dyn LoanPolicyRepository>) -> Self {
        Self { policy_repo }
    }
}

#[async_trait]
impl QueryHandler<GetLoanPolicyQuery> for GetLoanPolicyHandler {
    async fn handle(&self, _query: GetLoanPolicyQuery) -> AppResult<LoanPolicy> {
        self.policy_repo
            .get()
            .await?
            .ok_or_else(|| CirculationError::PolicyNotConfigured.into())
    }
}

/// 学生在借记录查询处理器
pub struct ListOpenIssuesHandler {
    issue_repo: Arc<dyn IssueRepository>,
}

impl ListOpenIssuesHandler {
    pub fn new(issue_repo: Arc<dyn IssueRepository>) -> Self {
        Self { issue_repo }
    }
}

#[async_trait]
impl QueryHandler<ListOpenIssuesQuery> for ListOpenIssuesHandler {
    async fn handle(&self, query: ListOpenIssuesQuery) -> AppResult<Vec<IssueRecord>> {
        self.issue_repo.find_open_by_student(&query.student_id).await
    }
}

/// 图书借阅历史查询处理器
pub struct ListBookHistoryHandler {
    issue_repo: Arc<dyn IssueRepository>,
    book_repo: Arc<dyn BookRepository>,
}

impl ListBookHistoryHandler {
    pub fn new(issue_repo: Arc<dyn IssueRepository>, book_repo: Arc<dyn BookRepository>) -> Self {
        Self {
            issue_repo,
            book_repo,
        }
    }
}

#[async_trait]
impl QueryHandler<ListBookHistoryQuery> for ListBookHistoryHandler {
    async fn handle(&self, query: ListBookHistoryQuery) -> AppResult<PagedResult<IssueRecord>> {
        // 先确认图书存在，避免对不存在的 ID 返回空历史
        if self.book_repo.find_by_id(&query.book_id).await?.is_none() {
            return Err(CirculationError::BookNotFound(query.book_id).into());
        }

        self.issue_repo
            .find_history_by_book(&query.book_id, &query.pagination)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        MockBookRepository, MockIssueRepository, MockLoanPolicyRepository,
    };
    use campus_common::{BookId, Pagination, StudentId};
    use campus_domain_core::Money;
    use chrono::NaiveDate;

    fn policy() -> LoanPolicy {
        LoanPolicy::new(3, 14, Money::inr(10), None).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn student_under_cap_is_eligible() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo.expect_get().returning(|| Ok(Some(policy())));
        let mut issue_repo = MockIssueRepository::new();
        issue_repo
            .expect_count_open_by_student()
            .returning(|_| Ok(1));

        let handler = CheckEligibilityHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let status = handler
            .handle(CheckEligibilityQuery {
                student_id: StudentId::new(),
            })
            .await
            .unwrap();

        assert!(status.eligible);
        assert_eq!(status.current_count, 1);
        assert_eq!(status.max_books, 3);
    }

    #[tokio::test]
    async fn student_at_cap_is_not_eligible() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo.expect_get().returning(|| Ok(Some(policy())));
        let mut issue_repo = MockIssueRepository::new();
        issue_repo
            .expect_count_open_by_student()
            .returning(|_| Ok(3));

        let handler = CheckEligibilityHandler::new(Arc::new(issue_repo), Arc::new(policy_repo));
        let status = handler
            .handle(CheckEligibilityQuery {
                student_id: StudentId::new(),
            })
            .await
            .unwrap();

        assert!(!status.eligible);
    }

    #[tokio::test]
    async fn fine_preview_matches_evaluator() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo.expect_get().returning(|| Ok(Some(policy())));

        let handler = PreviewFineHandler::new(Arc::new(policy_repo));
        let assessment = handler
            .handle(PreviewFineQuery {
                issue_date: date(2025, 1, 1),
                candidate_return_date: date(2025, 1, 20),
            })
            .await
            .unwrap();

        assert_eq!(assessment.due_date, date(2025, 1, 15));
        assert_eq!(assessment.overdue_days, 5);
        assert_eq!(assessment.fine, Money::inr(50));
    }

    #[tokio::test]
    async fn history_for_unknown_book_is_not_found() {
        let mut book_repo = MockBookRepository::new();
        book_repo.expect_find_by_id().returning(|_| Ok(None));
        let issue_repo = MockIssueRepository::new();

        let handler = ListBookHistoryHandler::new(Arc::new(issue_repo), Arc::new(book_repo));
        let err = handler
            .handle(ListBookHistoryQuery {
                book_id: BookId::new(),
                pagination: Pagination::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
