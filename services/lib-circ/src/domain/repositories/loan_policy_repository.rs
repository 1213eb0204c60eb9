//! 借阅策略仓储接口

use async_trait::async_trait;
use campus_errors::AppResult;

use crate::domain::entities::LoanPolicy;

/// 借阅策略仓储
///
/// 始终以数据库中的最新一条为当前策略
#[mockall::automock]
#[async_trait]
pub trait LoanPolicyRepository: Send + Sync {
    /// 读取当前策略
    async fn get(&self) -> AppResult<Option<LoanPolicy>>;

    /// 保存新策略（管理操作；只影响之后的计算）
    async fn save(&self, policy: &LoanPolicy) -> AppResult<()>;
}
