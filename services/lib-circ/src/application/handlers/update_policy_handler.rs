//! 借阅策略更新处理器

use std::sync::Arc;

use async_trait::async_trait;
use campus_cqrs_core::CommandHandler;
use campus_domain_core::{Currency, Money};
use campus_errors::AppResult;
use tracing::info;

use crate::application::commands::UpdateLoanPolicyCommand;
use crate::domain::entities::LoanPolicy;
use crate::domain::repositories::LoanPolicyRepository;

/// 借阅策略更新处理器（管理操作）
///
/// 新策略只影响之后的借出与罚金计算；已落库的 due_date 不回溯
pub struct UpdateLoanPolicyHandler {
    policy_repo: Arc<dyn LoanPolicyRepository>,
}

impl UpdateLoanPolicyHandler {
    pub fn new(policy_repo: Arc<dyn LoanPolicyRepository>) -> Self {
        Self { policy_repo }
    }
}

#[async_trait]
impl CommandHandler<UpdateLoanPolicyCommand> for UpdateLoanPolicyHandler {
    async fn handle(&self, command: UpdateLoanPolicyCommand) -> AppResult<LoanPolicy> {
        // 构造函数负责参数校验
        let policy = LoanPolicy::new(
            command.max_books_per_student,
            command.loan_period_days,
            Money::new(
                command.fine_per_day_minor,
                Currency::new(&command.fine_currency),
            ),
            command.updated_by,
        )?;

        self.policy_repo.save(&policy).await?;

        info!(
            policy_id = %policy.id,
            max_books = policy.max_books_per_student,
            loan_period_days = policy.loan_period_days,
            fine_per_day_minor = policy.fine_per_day.amount,
            "Loan policy updated"
        );

        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLoanPolicyRepository;

    fn command() -> UpdateLoanPolicyCommand {
        UpdateLoanPolicyCommand {
            max_books_per_student: 5,
            loan_period_days: 21,
            fine_per_day_minor: 20,
            fine_currency: "inr".to_string(),
            updated_by: None,
        }
    }

    #[tokio::test]
    async fn saves_validated_policy() {
        let mut policy_repo = MockLoanPolicyRepository::new();
        policy_repo.expect_save().returning(|_| Ok(()));

        let handler = UpdateLoanPolicyHandler::new(Arc::new(policy_repo));
        let policy = handler.handle(command()).await.unwrap();

        assert_eq!(policy.max_books_per_student, 5);
        assert_eq!(policy.loan_period_days, 21);
        assert_eq!(policy.fine_per_day, Money::inr(20));
    }

    #[tokio::test]
    async fn invalid_values_never_reach_storage() {
        // save 不设期望：到达即 panic
        let policy_repo = MockLoanPolicyRepository::new();
        let handler = UpdateLoanPolicyHandler::new(Arc::new(policy_repo));

        let mut bad = command();
        bad.loan_period_days = 0;
        let err = handler.handle(bad).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
