//! 借阅记录实体

use campus_common::{BookId, IssueId, StudentId, UserId};
use campus_domain_core::{AggregateRoot, AuditInfo, Entity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CirculationError, CirculationResult};

/// 借阅记录状态
///
/// 状态机只有一条迁移：issued -> returned（终态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Issued,
    Returned,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Returned => "returned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "issued" => Some(Self::Issued),
            "returned" => Some(Self::Returned),
            _ => None,
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 借阅记录
///
/// 将一册图书与一名学生关联；创建后永不删除，归还时只更新
/// return_date 与 status。due_date 在借出时按当时策略落库，
/// 策略后续变更不回溯已借出的记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: IssueId,
    pub book_id: BookId,
    pub student_id: StudentId,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: IssueStatus,
    pub audit: AuditInfo,
}

impl IssueRecord {
    /// 创建一条新的在借记录
    pub fn new_issued(
        book_id: BookId,
        student_id: StudentId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        issued_by: Option<UserId>,
    ) -> Self {
        Self {
            id: IssueId::new(),
            book_id,
            student_id,
            issue_date,
            due_date,
            return_date: None,
            status: IssueStatus::Issued,
            audit: AuditInfo::new(issued_by),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == IssueStatus::Issued
    }

    /// 归还迁移；重复归还被拒绝
    pub fn mark_returned(
        &mut self,
        return_date: NaiveDate,
        returned_by: Option<UserId>,
    ) -> CirculationResult<()> {
        if self.status == IssueStatus::Returned {
            return Err(CirculationError::AlreadyReturned(self.id));
        }
        if return_date < self.issue_date {
            return Err(CirculationError::ReturnBeforeIssue {
                issue_date: self.issue_date,
                return_date,
            });
        }
        self.status = IssueStatus::Returned;
        self.return_date = Some(return_date);
        self.audit.update(returned_by);
        Ok(())
    }
}

impl Entity for IssueRecord {
    type Id = IssueId;

    fn id(&self) -> &IssueId {
        &self.id
    }
}

impl AggregateRoot for IssueRecord {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> IssueRecord {
        IssueRecord::new_issued(
            BookId::new(),
            StudentId::new(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            None,
        )
    }

    #[test]
    fn new_record_is_open() {
        let r = record();
        assert!(r.is_open());
        assert_eq!(r.status, IssueStatus::Issued);
        assert!(r.return_date.is_none());
    }

    #[test]
    fn return_transition_is_terminal() {
        let mut r = record();
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        r.mark_returned(date, None).unwrap();
        assert!(!r.is_open());
        assert_eq!(r.return_date, Some(date));

        // 第二次归还必须失败，而不是再次加一可借副本
        let err = r.mark_returned(date, None).unwrap_err();
        assert!(matches!(err, CirculationError::AlreadyReturned(_)));
    }

    #[test]
    fn return_before_issue_is_rejected() {
        let mut r = record();
        let err = r
            .mark_returned(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), None)
            .unwrap_err();
        assert!(matches!(err, CirculationError::ReturnBeforeIssue { .. }));
    }

    #[test]
    fn status_string_roundtrip() {
        assert_eq!(IssueStatus::parse("issued"), Some(IssueStatus::Issued));
        assert_eq!(IssueStatus::parse("returned"), Some(IssueStatus::Returned));
        assert_eq!(IssueStatus::parse("lost"), None);
    }
}
