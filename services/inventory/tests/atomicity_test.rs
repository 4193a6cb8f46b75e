//! 原子性测试
//!
//! 流水追加失败时，同一事务中已发出的库存写入必须一并消失。

use std::sync::Arc;

use async_trait::async_trait;
use common::{PagedResult, Pagination};
use errors::{AppError, AppResult};

use inventory::domain::entities::{ProductVariant, StockMovement};
use inventory::domain::enums::MovementType;
use inventory::domain::repositories::{StockMovementRepository, VariantRepository};
use inventory::domain::services::{StockAdjustment, StockService};
use inventory::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use inventory::domain::value_objects::VariantId;
use inventory::infrastructure::persistence::{InMemoryInventory, InMemoryUnitOfWorkFactory};

// ============================================================
// 注入失败的流水存储
// ============================================================

struct FailingMovementRepository;

#[async_trait]
impl StockMovementRepository for FailingMovementRepository {
    async fn append(&self, _movement: &StockMovement) -> AppResult<()> {
        Err(AppError::database("simulated ledger failure"))
    }

    async fn find_by_variant(
        &self,
        _variant_id: &VariantId,
        _pagination: &Pagination,
    ) -> AppResult<PagedResult<StockMovement>> {
        Err(AppError::database("simulated ledger failure"))
    }

    async fn sum_changes(&self, _variant_id: &VariantId) -> AppResult<i64> {
        Err(AppError::database("simulated ledger failure"))
    }
}

/// 变体写入走真实事务、流水追加必然失败的 Unit of Work
struct FailingLedgerUnitOfWork {
    inner: Box<dyn UnitOfWork>,
    movements: FailingMovementRepository,
}

#[async_trait]
impl UnitOfWork for FailingLedgerUnitOfWork {
    fn variants(&self) -> &dyn VariantRepository {
        self.inner.variants()
    }

    fn stock_movements(&self) -> &dyn StockMovementRepository {
        &self.movements
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let this = *self;
        this.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let this = *self;
        this.inner.rollback().await
    }
}

struct FailingLedgerFactory {
    inner: InMemoryUnitOfWorkFactory,
}

#[async_trait]
impl UnitOfWorkFactory for FailingLedgerFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(FailingLedgerUnitOfWork {
            inner: self.inner.begin().await?,
            movements: FailingMovementRepository,
        }))
    }
}

fn seed_variant(store: &InMemoryInventory, stock: i64) -> VariantId {
    let variant = ProductVariant::new("TSHIRT-RED-M", stock);
    let variant_id = variant.id.clone();
    store.seed_variant(variant);
    variant_id
}

// ============================================================
// 测试
// ============================================================

#[tokio::test]
async fn test_ledger_failure_rolls_back_stock_write_in_service_scope() {
    let store = InMemoryInventory::new();
    let variant_id = seed_variant(&store, 9);
    let service = StockService::new(Arc::new(FailingLedgerFactory {
        inner: InMemoryUnitOfWorkFactory::new(store.clone()),
    }));

    let err = service
        .adjust_variant_stock(StockAdjustment::new(
            variant_id.clone(),
            -4,
            MovementType::Sale,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    // 库存写入已发出，但随事务一并回滚
    assert_eq!(store.committed_variant(&variant_id).unwrap().stock, 9);
    assert!(store.committed_movements(&variant_id).is_empty());
}

#[tokio::test]
async fn test_ledger_failure_rolls_back_stock_write_in_caller_scope() {
    let store = InMemoryInventory::new();
    let variant_id = seed_variant(&store, 9);
    let factory = InMemoryUnitOfWorkFactory::new(store.clone());
    let service = StockService::new(Arc::new(InMemoryUnitOfWorkFactory::new(store.clone())));

    let uow: Box<dyn UnitOfWork> = Box::new(FailingLedgerUnitOfWork {
        inner: factory.begin().await.unwrap(),
        movements: FailingMovementRepository,
    });

    let err = service
        .adjust_variant_stock_in(
            uow.as_ref(),
            StockAdjustment::new(variant_id.clone(), -4, MovementType::Sale),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    // 调用方回滚后，库存维持原值
    uow.rollback().await.unwrap();
    assert_eq!(store.committed_variant(&variant_id).unwrap().stock, 9);
    assert!(store.committed_movements(&variant_id).is_empty());
}
