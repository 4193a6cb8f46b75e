//! 商品变体 Repository trait 定义

use async_trait::async_trait;
use errors::AppResult;

use crate::domain::entities::ProductVariant;
use crate::domain::value_objects::VariantId;

/// 商品变体 Repository
///
/// 所有实现都在某个事务范围内执行（见 `UnitOfWork`）。
#[async_trait]
pub trait VariantRepository: Send + Sync {
    /// 根据 ID 查找变体
    async fn find_by_id(&self, id: &VariantId) -> AppResult<Option<ProductVariant>>;

    /// 根据 ID 查找变体并持有排他行锁（select ... for update）
    ///
    /// 对同一变体的并发调用会阻塞到持锁事务提交或回滚为止；
    /// 不同变体之间互不阻塞。
    async fn find_by_id_for_update(&self, id: &VariantId) -> AppResult<Option<ProductVariant>>;

    /// 插入新变体
    async fn save(&self, variant: &ProductVariant) -> AppResult<()>;

    /// 持久化变体的可变字段
    async fn update(&self, variant: &ProductVariant) -> AppResult<()>;
}
