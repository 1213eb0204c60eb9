//! 借阅策略实体

use campus_common::{PolicyId, UserId};
use campus_domain_core::{AggregateRoot, AuditInfo, Entity, Money};
use campus_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 借阅策略
///
/// 每名学生的借书上限、默认借期与每逾期日罚金。
/// 作为显式参数传入计算函数，不做进程级可变全局；
/// 修改只影响之后的借出与计算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPolicy {
    pub id: PolicyId,
    pub max_books_per_student: u32,
    pub loan_period_days: u32,
    pub fine_per_day: Money,
    pub audit: AuditInfo,
}

impl LoanPolicy {
    pub fn new(
        max_books_per_student: u32,
        loan_period_days: u32,
        fine_per_day: Money,
        created_by: Option<UserId>,
    ) -> AppResult<Self> {
        if max_books_per_student == 0 {
            return Err(AppError::validation("Max books per student must be at least 1"));
        }
        if loan_period_days == 0 {
            return Err(AppError::validation("Loan period must be at least 1 day"));
        }
        if fine_per_day.is_negative() {
            return Err(AppError::validation("Fine per day cannot be negative"));
        }

        Ok(Self {
            id: PolicyId::new(),
            max_books_per_student,
            loan_period_days,
            fine_per_day,
            audit: AuditInfo::new(created_by),
        })
    }

    /// 从存储行重建
    pub fn from_parts(
        id: PolicyId,
        max_books_per_student: u32,
        loan_period_days: u32,
        fine_per_day: Money,
        audit: AuditInfo,
    ) -> Self {
        Self {
            id,
            max_books_per_student,
            loan_period_days,
            fine_per_day,
            audit,
        }
    }
}

impl Entity for LoanPolicy {
    type Id = PolicyId;

    fn id(&self) -> &PolicyId {
        &self.id
    }
}

impl AggregateRoot for LoanPolicy {
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

    #[test]
    fn valid_policy_is_accepted() {
        let policy = LoanPolicy::new(3, 14, Money::inr(10), None).unwrap();
        assert_eq!(policy.max_books_per_student, 3);
        assert_eq!(policy.loan_period_days, 14);
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(LoanPolicy::new(0, 14, Money::inr(10), None).is_err());
        assert!(LoanPolicy::new(3, 0, Money::inr(10), None).is_err());
        assert!(LoanPolicy::new(3, 14, Money::inr(-1), None).is_err());
    }
}
