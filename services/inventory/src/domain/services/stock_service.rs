//! 库存调整领域服务
//!
//! 变体库存的唯一合法修改入口：行锁串行化并发调整，
//! 校验库存不为负，并在同一事务内追加流水记录。

use std::sync::Arc;

use errors::AppResult;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{ProductVariant, StockMovement};
use crate::domain::enums::MovementType;
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::value_objects::VariantId;
use crate::error::InventoryError;

/// 一次库存调整的参数
#[derive(Debug, Clone)]
pub struct StockAdjustment {
    pub variant_id: VariantId,
    pub change: i64,
    pub movement_type: MovementType,
    pub related_id: Option<Uuid>,
    pub note: Option<String>,
}

impl StockAdjustment {
    pub fn new(variant_id: VariantId, change: i64, movement_type: MovementType) -> Self {
        Self {
            variant_id,
            change,
            movement_type,
            related_id: None,
            note: None,
        }
    }

    pub fn with_related_id(mut self, related_id: Uuid) -> Self {
        self.related_id = Some(related_id);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// 库存调整服务
pub struct StockService {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl StockService {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 调整变体库存（服务自管事务）
    ///
    /// 开启新事务执行调整；成功即提交，失败回滚后原样抛出错误。
    pub async fn adjust_variant_stock(
        &self,
        adjustment: StockAdjustment,
    ) -> AppResult<ProductVariant> {
        let uow = self.uow_factory.begin().await?;

        match self.adjust_variant_stock_in(uow.as_ref(), adjustment).await {
            Ok(variant) => {
                uow.commit().await?;
                Ok(variant)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed stock adjustment also failed");
                }
                Err(err)
            }
        }
    }

    /// 在调用方提供的事务中调整变体库存
    ///
    /// 调用方可以在同一个 `UnitOfWork` 中组合多次调整与其他写入，
    /// 由调用方负责提交或回滚。出错时本方法不写任何数据。
    pub async fn adjust_variant_stock_in(
        &self,
        uow: &dyn UnitOfWork,
        adjustment: StockAdjustment,
    ) -> AppResult<ProductVariant> {
        let StockAdjustment {
            variant_id,
            change,
            movement_type,
            related_id,
            note,
        } = adjustment;

        // 排他行锁：对同一变体的并发调整在此串行化
        let mut variant = uow
            .variants()
            .find_by_id_for_update(&variant_id)
            .await?
            .ok_or(InventoryError::VariantNotFound)?;

        // 不变量校验必须先于任何写入
        let next = variant.stock + change;
        if next < 0 {
            warn!(
                variant_id = %variant_id,
                stock = variant.stock,
                change,
                "Stock adjustment rejected: would go negative"
            );
            return Err(InventoryError::InsufficientStock {
                available: variant.stock,
                change,
            }
            .into());
        }

        variant.set_stock(next);
        uow.variants().update(&variant).await?;

        let mut movement = StockMovement::new(variant_id, change, movement_type);
        if let Some(related_id) = related_id {
            movement = movement.with_related_id(related_id);
        }
        if let Some(note) = note {
            movement = movement.with_note(note);
        }
        uow.stock_movements().append(&movement).await?;

        info!(
            variant_id = %variant.id,
            change,
            movement_type = %movement_type,
            stock = variant.stock,
            "Stock adjusted"
        );

        Ok(variant)
    }
}
