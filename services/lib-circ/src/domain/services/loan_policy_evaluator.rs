//! 借阅策略评估
//!
//! 应期日、逾期天数与罚金的纯函数计算。全部按自然日粒度比较，
//! 不依赖已落库的 due_date，可独立重新推导（支持归还前的 what-if 预览）

use campus_domain_core::Money;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::entities::LoanPolicy;

/// 罚金评估结果（派生值，不落库）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineAssessment {
    pub due_date: NaiveDate,
    pub overdue_days: u32,
    pub fine: Money,
}

/// 借阅资格判定结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityStatus {
    pub eligible: bool,
    pub current_count: u32,
    pub max_books: u32,
}

/// 借阅策略评估器
pub struct LoanPolicyEvaluator;

impl LoanPolicyEvaluator {
    /// 应还日期 = 借出日期 + 借期（自然日，不跳过节假日）
    pub fn due_date(policy: &LoanPolicy, issue_date: NaiveDate) -> NaiveDate {
        issue_date
            .checked_add_days(Days::new(policy.loan_period_days as u64))
            .unwrap_or(NaiveDate::MAX)
    }

    /// 按候选归还日期重新推导应还日并计算罚金
    ///
    /// overdue_days = max(0, return_date - due_date)，
    /// fine = overdue_days * fine_per_day
    pub fn assess_fine(
        policy: &LoanPolicy,
        issue_date: NaiveDate,
        return_date: NaiveDate,
    ) -> FineAssessment {
        let due_date = Self::due_date(policy, issue_date);
        let overdue_days = (return_date - due_date).num_days().max(0) as u32;
        let fine = policy.fine_per_day.clone() * overdue_days as i64;

        FineAssessment {
            due_date,
            overdue_days,
            fine,
        }
    }

    /// 借出前的资格判定：在借数量达到上限即不可再借
    ///
    /// 该判定在选择图书时仅作提示；提交借出时由存储侧在同一事务内
    /// 再次强制执行，避免两个并发借出请求同时通过读时检查
    pub fn evaluate_eligibility(policy: &LoanPolicy, open_count: u32) -> EligibilityStatus {
        EligibilityStatus {
            eligible: open_count < policy.max_books_per_student,
            current_count: open_count,
            max_books: policy.max_books_per_student,
        }
    }
}
