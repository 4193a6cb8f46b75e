//! Business logic handler

use std::sync::Arc;

use async_trait::async_trait;
use common::PagedResult;
use cqrs_core::{CommandHandler, QueryHandler};
use errors::{AppError, AppResult};
use tracing::info;

use crate::domain::entities::{ProductVariant, StockMovement};
use crate::domain::enums::MovementType;
use crate::domain::services::{StockAdjustment, StockService};
use crate::domain::unit_of_work::UnitOfWorkFactory;

use super::commands::*;
use super::queries::*;

pub struct ServiceHandler {
    stock_service: StockService,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl ServiceHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self {
            stock_service: StockService::new(uow_factory.clone()),
            uow_factory,
        }
    }

    // ========== 库存调整 ==========

    /// 调整变体库存
    pub async fn adjust_stock(&self, cmd: AdjustStockCommand) -> AppResult<ProductVariant> {
        cmd.validate()?;

        let movement_type = cmd.movement_type;
        let mut adjustment =
            StockAdjustment::new(cmd.variant_id.clone(), cmd.change, movement_type);
        if let Some(related_id) = cmd.related_id {
            adjustment = adjustment.with_related_id(related_id);
        }
        if let Some(note) = cmd.note {
            adjustment = adjustment.with_note(note);
        }

        match self.stock_service.adjust_variant_stock(adjustment).await {
            Ok(variant) => {
                metrics::counter!(
                    "stock_adjustments_total",
                    "movement_type" => movement_type.as_str()
                )
                .increment(1);
                Ok(variant)
            }
            Err(err) => {
                let reason = match &err {
                    AppError::NotFound(_) => "not_found",
                    AppError::Validation(_) => "insufficient_stock",
                    _ => "infrastructure",
                };
                metrics::counter!(
                    "stock_adjustment_errors_total",
                    "movement_type" => movement_type.as_str(),
                    "reason" => reason
                )
                .increment(1);
                Err(err)
            }
        }
    }

    /// 创建变体
    ///
    /// 初始库存大于零时，通过常规调整路径写入一条初始流水，
    /// 保证变体从创建起就满足「库存 = 流水总和」。
    pub async fn create_variant(&self, cmd: CreateVariantCommand) -> AppResult<ProductVariant> {
        cmd.validate()?;

        let variant = ProductVariant::new(cmd.sku.clone(), 0);
        let uow = self.uow_factory.begin().await?;

        uow.variants().save(&variant).await?;

        let variant = if cmd.initial_stock > 0 {
            let adjustment = StockAdjustment::new(
                variant.id.clone(),
                cmd.initial_stock,
                MovementType::Adjustment,
            )
            .with_note("initial stock");

            self.stock_service
                .adjust_variant_stock_in(uow.as_ref(), adjustment)
                .await?
        } else {
            variant
        };

        uow.commit().await?;

        info!(variant_id = %variant.id, sku = %variant.sku, "Variant created");
        Ok(variant)
    }

    // ========== 查询 ==========

    /// 获取变体
    pub async fn get_variant(&self, query: GetVariantQuery) -> AppResult<ProductVariant> {
        let uow = self.uow_factory.begin().await?;
        let variant = uow.variants().find_by_id(&query.variant_id).await?;
        uow.commit().await?;

        variant.ok_or_else(|| AppError::not_found("Product variant not found"))
    }

    /// 分页查询库存流水
    pub async fn list_stock_movements(
        &self,
        query: ListStockMovementsQuery,
    ) -> AppResult<PagedResult<StockMovement>> {
        let uow = self.uow_factory.begin().await?;
        let movements = uow
            .stock_movements()
            .find_by_variant(&query.variant_id, &query.pagination)
            .await?;
        uow.commit().await?;

        Ok(movements)
    }

    /// 变体库存对账
    ///
    /// 在同一事务中读取库存与流水总和，保证两者来自同一快照。
    pub async fn reconcile_variant(
        &self,
        query: ReconcileVariantQuery,
    ) -> AppResult<StockReconciliation> {
        let uow = self.uow_factory.begin().await?;

        let variant = uow
            .variants()
            .find_by_id(&query.variant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Product variant not found"))?;
        let ledger_total = uow.stock_movements().sum_changes(&query.variant_id).await?;

        uow.commit().await?;

        Ok(StockReconciliation {
            variant_id: variant.id,
            stock: variant.stock,
            ledger_total,
        })
    }
}

// ============================================================
// CQRS handler 实现
// ============================================================

#[async_trait]
impl CommandHandler<AdjustStockCommand> for ServiceHandler {
    async fn handle(&self, command: AdjustStockCommand) -> AppResult<ProductVariant> {
        self.adjust_stock(command).await
    }
}

#[async_trait]
impl CommandHandler<CreateVariantCommand> for ServiceHandler {
    async fn handle(&self, command: CreateVariantCommand) -> AppResult<ProductVariant> {
        self.create_variant(command).await
    }
}

#[async_trait]
impl QueryHandler<GetVariantQuery> for ServiceHandler {
    async fn handle(&self, query: GetVariantQuery) -> AppResult<ProductVariant> {
        self.get_variant(query).await
    }
}

#[async_trait]
impl QueryHandler<ListStockMovementsQuery> for ServiceHandler {
    async fn handle(&self, query: ListStockMovementsQuery) -> AppResult<PagedResult<StockMovement>> {
        self.list_stock_movements(query).await
    }
}

#[async_trait]
impl QueryHandler<ReconcileVariantQuery> for ServiceHandler {
    async fn handle(&self, query: ReconcileVariantQuery) -> AppResult<StockReconciliation> {
        self.reconcile_variant(query).await
    }
}
