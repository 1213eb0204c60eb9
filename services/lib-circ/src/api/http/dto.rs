//! HTTP 请求/响应结构
//!
//! 入站请求在此边界完成解析与基本校验，进入应用层后只流转
//! 已验证的领域类型

use campus_common::PagedResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{IssueRecord, LoanPolicy};
use crate::domain::services::{EligibilityStatus, FineAssessment};

/// 借出请求
#[derive(Debug, Deserialize)]
pub struct IssueBookRequest {
    pub book_id: Uuid,
    pub student_id: Uuid,
    /// 缺省为当天
    pub issue_date: Option<NaiveDate>,
    pub issued_by: Option<Uuid>,
}

/// 归还请求
#[derive(Debug, Deserialize)]
pub struct ReturnBookRequest {
    /// 缺省为当天
    pub return_date: Option<NaiveDate>,
    pub returned_by: Option<Uuid>,
}

/// 策略更新请求
#[derive(Debug, Deserialize)]
pub struct UpdatePolicyRequest {
    pub max_books_per_student: u32,
    pub loan_period_days: u32,
    pub fine_per_day_minor: i64,
    pub fine_currency: String,
    pub updated_by: Option<Uuid>,
}

/// 罚金预览查询参数
#[derive(Debug, Deserialize)]
pub struct FinePreviewParams {
    pub issue_date: NaiveDate,
    pub return_date: NaiveDate,
}

/// 在借记录查询参数
#[derive(Debug, Deserialize)]
pub struct OpenIssuesParams {
    pub student_id: Uuid,
}

/// 分页查询参数
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// 借阅记录响应
#[derive(Debug, Serialize, Deserialize)]
pub struct IssueRecordDto {
    pub id: Uuid,
    pub book_id: Uuid,
    pub student_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
}

impl From<IssueRecord> for IssueRecordDto {
    fn from(record: IssueRecord) -> Self {
        Self {
            id: record.id.0,
            book_id: record.book_id.0,
            student_id: record.student_id.0,
            issue_date: record.issue_date,
            due_date: record.due_date,
            return_date: record.return_date,
            status: record.status.as_str().to_string(),
        }
    }
}

/// 罚金评估响应
#[derive(Debug, Serialize, Deserialize)]
pub struct FineDto {
    pub due_date: NaiveDate,
    pub overdue_days: u32,
    pub fine_minor: i64,
    pub currency: String,
}

impl From<FineAssessment> for FineDto {
    fn from(assessment: FineAssessment) -> Self {
        Self {
            due_date: assessment.due_date,
            overdue_days: assessment.overdue_days,
            fine_minor: assessment.fine.amount,
            currency: assessment.fine.currency.as_str().to_string(),
        }
    }
}

/// 归还响应：更新后的记录与罚金评估
#[derive(Debug, Serialize, Deserialize)]
pub struct CompletedReturnDto {
    pub record: IssueRecordDto,
    pub fine: FineDto,
}

/// 资格查询响应
#[derive(Debug, Serialize, Deserialize)]
pub struct EligibilityDto {
    pub eligible: bool,
    pub current_count: u32,
    pub max_books: u32,
}

impl From<EligibilityStatus> for EligibilityDto {
    fn from(status: EligibilityStatus) -> Self {
        Self {
            eligible: status.eligible,
            current_count: status.current_count,
            max_books: status.max_books,
        }
    }
}

/// 借阅策略响应
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanPolicyDto {
    pub id: Uuid,
    pub max_books_per_student: u32,
    pub loan_period_days: u32,
    pub fine_per_day_minor: i64,
    pub fine_currency: String,
}

impl From<LoanPolicy> for LoanPolicyDto {
    fn from(policy: LoanPolicy) -> Self {
        Self {
            id: policy.id.0,
            max_books_per_student: policy.max_books_per_student,
            loan_period_days: policy.loan_period_days,
            fine_per_day_minor: policy.fine_per_day.amount,
            fine_currency: policy.fine_per_day.currency.as_str().to_string(),
        }
    }
}

pub(crate) fn map_paged<T, U: From<T>>(paged: PagedResult<T>) -> PagedResult<U> {
    PagedResult {
        items: paged.items.into_iter().map(U::from).collect(),
        total: paged.total,
        page: paged.page,
        page_size: paged.page_size,
    }
}
