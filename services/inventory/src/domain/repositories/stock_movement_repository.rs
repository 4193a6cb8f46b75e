//! 库存流水 Repository trait 定义

use async_trait::async_trait;
use common::{PagedResult, Pagination};
use errors::AppResult;

use crate::domain::entities::StockMovement;
use crate::domain::value_objects::VariantId;

/// 库存流水 Repository
///
/// 流水只追加；没有 update/delete 操作。
#[async_trait]
pub trait StockMovementRepository: Send + Sync {
    /// 追加一条不可变流水记录
    async fn append(&self, movement: &StockMovement) -> AppResult<()>;

    /// 分页查询某个变体的流水，按创建时间倒序
    async fn find_by_variant(
        &self,
        variant_id: &VariantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<StockMovement>>;

    /// 某个变体所有流水 change 的总和（对账用）
    async fn sum_changes(&self, variant_id: &VariantId) -> AppResult<i64>;
}
