//! Unit of Work 模式
//!
//! 提供跨多个 Repository 的事务协调能力，确保操作的原子性。

use async_trait::async_trait;
use errors::AppResult;

use crate::domain::repositories::{StockMovementRepository, VariantRepository};

/// Unit of Work trait
///
/// 协调变体写入与流水追加在同一事务中执行。
///
/// # 使用示例
///
/// ```ignore
/// let uow = uow_factory.begin().await?;
///
/// // 所有操作在同一事务中
/// uow.variants().update(&variant).await?;
/// uow.stock_movements().append(&movement).await?;
///
/// // 提交事务
/// uow.commit().await?;
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 获取变体 Repository
    fn variants(&self) -> &dyn VariantRepository;

    /// 获取库存流水 Repository
    fn stock_movements(&self) -> &dyn StockMovementRepository;

    /// 提交事务
    ///
    /// 成功时所有更改将持久化，失败时自动回滚。
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    ///
    /// 撤销所有未提交的更改。
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
