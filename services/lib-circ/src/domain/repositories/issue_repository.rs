//! 借阅记录仓储接口

use async_trait::async_trait;
use campus_common::{BookId, IssueId, PagedResult, Pagination, StudentId, UserId};
use campus_errors::AppResult;
use chrono::NaiveDate;

use crate::domain::entities::{IssueRecord, LoanPolicy};

/// 借出事件
#[derive(Debug, Clone)]
pub struct CreateIssue {
    pub book_id: BookId,
    pub student_id: StudentId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub issued_by: Option<UserId>,
}

/// 归还事件
#[derive(Debug, Clone)]
pub struct ReturnIssue {
    pub issue_id: IssueId,
    pub return_date: NaiveDate,
    pub returned_by: Option<UserId>,
}

/// 借阅记录仓储
#[mockall::automock]
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// 借出操作
    ///
    /// 资格上限与可借副本数的校验必须与写入在同一事务内完成：
    /// 读时检查只是提示，提交时刻的条件更新才是裁决
    async fn create(&self, event: CreateIssue, policy: &LoanPolicy) -> AppResult<IssueRecord>;

    /// 归还操作；对同一记录的第二次归还必须失败
    async fn mark_returned(&self, event: ReturnIssue) -> AppResult<IssueRecord>;

    /// 根据 ID 查找
    async fn find_by_id(&self, id: &IssueId) -> AppResult<Option<IssueRecord>>;

    /// 学生当前在借（未归还）数量
    async fn count_open_by_student(&self, student_id: &StudentId) -> AppResult<u32>;

    /// 学生当前在借的记录
    async fn find_open_by_student(&self, student_id: &StudentId) -> AppResult<Vec<IssueRecord>>;

    /// 某册图书的借阅历史（含已归还）
    async fn find_history_by_book(
        &self,
        book_id: &BookId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<IssueRecord>>;
}
