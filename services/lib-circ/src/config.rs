//! 服务级配置辅助

use campus_config::CirculationConfig;
use campus_domain_core::{Currency, Money};
use campus_errors::AppResult;

use crate::domain::entities::LoanPolicy;

/// 由兜底配置构造初始借阅策略
///
/// 仅在 loan_policies 表为空时播种；之后以数据库记录为准
pub fn fallback_policy(config: &CirculationConfig) -> AppResult<LoanPolicy> {
    LoanPolicy::new(
        config.max_books_per_student,
        config.loan_period_days,
        Money::new(
            config.fine_per_day_minor,
            Currency::new(&config.fine_currency),
        ),
        None,
    )
}
