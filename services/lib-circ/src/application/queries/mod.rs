//! 流通查询定义

use campus_common::{BookId, PagedResult, Pagination, StudentId};
use campus_cqrs_core::Query;
use chrono::NaiveDate;

use crate::domain::entities::{IssueRecord, LoanPolicy};
use crate::domain::services::{EligibilityStatus, FineAssessment};

/// 借出前的资格查询（提示性；提交时仍会再校验）
#[derive(Debug, Clone)]
pub struct CheckEligibilityQuery {
    pub student_id: StudentId,
}

impl Query for CheckEligibilityQuery {
    type Result = EligibilityStatus;
}

/// 罚金 what-if 预览：给定借出日与候选归还日，按当前策略重推
#[derive(Debug, Clone)]
pub struct PreviewFineQuery {
    pub issue_date: NaiveDate,
    pub candidate_return_date: NaiveDate,
}

impl Query for PreviewFineQuery {
    type Result = FineAssessment;
}

/// 当前借阅策略
#[derive(Debug, Clone)]
pub struct GetLoanPolicyQuery;

impl Query for GetLoanPolicyQuery {
    type Result = LoanPolicy;
}

/// 学生当前在借记录
#[derive(Debug, Clone)]
pub struct ListOpenIssuesQuery {
    pub student_id: StudentId,
}

impl Query for ListOpenIssuesQuery {
    type Result = Vec<IssueRecord>;
}

/// 某册图书的借阅历史
#[derive(Debug, Clone)]
pub struct ListBookHistoryQuery {
    pub book_id: BookId,
    pub pagination: Pagination,
}

impl Query for ListBookHistoryQuery {
    type Result = PagedResult<IssueRecord>;
}
