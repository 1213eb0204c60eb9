//! 流通命令定义

use campus_common::{BookId, IssueId, StudentId, UserId};
use campus_cqrs_core::Command;
use chrono::NaiveDate;

use crate::domain::entities::{IssueRecord, LoanPolicy};
use crate::domain::services::FineAssessment;

/// 借出图书
#[derive(Debug, Clone)]
pub struct IssueBookCommand {
    pub book_id: BookId,
    pub student_id: StudentId,
    pub issue_date: NaiveDate,
    pub issued_by: Option<UserId>,
}

impl Command for IssueBookCommand {
    type Result = IssueRecord;
}

/// 归还图书
#[derive(Debug, Clone)]
pub struct ReturnBookCommand {
    pub issue_id: IssueId,
    pub return_date: NaiveDate,
    pub returned_by: Option<UserId>,
}

/// 归还结果：更新后的记录与按当前策略评估的罚金
#[derive(Debug, Clone)]
pub struct CompletedReturn {
    pub record: IssueRecord,
    pub assessment: FineAssessment,
}

impl Command for ReturnBookCommand {
    type Result = CompletedReturn;
}

/// 更新借阅策略（管理操作）
#[derive(Debug, Clone)]
pub struct UpdateLoanPolicyCommand {
    pub max_books_per_student: u32,
    pub loan_period_days: u32,
    pub fine_per_day_minor: i64,
    pub fine_currency: String,
    pub updated_by: Option<UserId>,
}

impl Command for UpdateLoanPolicyCommand {
    type Result = LoanPolicy;
}
