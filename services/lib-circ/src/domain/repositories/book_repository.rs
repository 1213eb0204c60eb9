//! 图书仓储接口

use async_trait::async_trait;
use campus_common::{BookId, PagedResult, Pagination};
use campus_errors::AppResult;

use crate::domain::entities::Book;

/// 图书仓储
#[mockall::automock]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 根据 ID 查找
    async fn find_by_id(&self, id: &BookId) -> AppResult<Option<Book>>;

    /// 保存图书（登记或修改馆藏信息）
    async fn save(&self, book: &Book) -> AppResult<()>;

    /// 分页查询馆藏
    async fn find_all(&self, pagination: &Pagination) -> AppResult<PagedResult<Book>>;
}
