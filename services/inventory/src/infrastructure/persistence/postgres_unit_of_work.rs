//! PostgreSQL Unit of Work 实现
//!
//! 使用 SQLx Transaction 提供事务协调能力。

use adapter_postgres::TransactionManager;
use async_trait::async_trait;
use errors::{AppError, AppResult};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::repositories::{StockMovementRepository, VariantRepository};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

use super::tx_repositories::{SharedTx, TxStockMovementRepository, TxVariantRepository};

/// PostgreSQL Unit of Work 工厂
pub struct PostgresUnitOfWorkFactory {
    tx_manager: TransactionManager,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tx_manager: TransactionManager::new(pool),
        }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.tx_manager.begin().await?;

        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

/// PostgreSQL Unit of Work 实现
///
/// 持有一个事务和所有相关的 Repository 实例。
/// 所有 Repository 操作都在同一个事务中执行。
pub struct PostgresUnitOfWork {
    /// 使用 Arc<Mutex> 包装 Transaction，使其可以被多个 Repository 共享
    tx: SharedTx,

    variant_repo: TxVariantRepository,
    movement_repo: TxStockMovementRepository,
}

impl PostgresUnitOfWork {
    fn new(tx: sqlx::Transaction<'static, sqlx::Postgres>) -> Self {
        let tx: SharedTx = Arc::new(Mutex::new(Some(tx)));

        Self {
            tx: tx.clone(),
            variant_repo: TxVariantRepository::new(tx.clone()),
            movement_repo: TxStockMovementRepository::new(tx),
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn variants(&self) -> &dyn VariantRepository {
        &self.variant_repo
    }

    fn stock_movements(&self) -> &dyn StockMovementRepository {
        &self.movement_repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        TransactionManager::commit(tx).await
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        TransactionManager::rollback(tx).await
    }
}
