//! 事务感知的 Repository 实现
//!
//! 这些 Repository 使用共享的 Transaction 而非 PgPool。

use async_trait::async_trait;
use common::{PagedResult, Pagination};
use errors::{AppError, AppResult};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::{ProductVariant, StockMovement};
use crate::domain::repositories::{StockMovementRepository, VariantRepository};
use crate::domain::value_objects::VariantId;

use super::rows::{ProductVariantRow, StockMovementRow};

/// 共享事务类型
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// 宏：定义一个简单的 TxRepository 结构体
macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxVariantRepository);
define_tx_repo!(TxStockMovementRepository);

// =============================================================================
// VariantRepository 实现
// =============================================================================

#[async_trait]
impl VariantRepository for TxVariantRepository {
    async fn find_by_id(&self, id: &VariantId) -> AppResult<Option<ProductVariant>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, ProductVariantRow>(
            r#"
            SELECT id, sku, stock, created_at, created_by, updated_at, updated_by
            FROM product_variants
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find variant: {}", e)))?;

        Ok(row.map(ProductVariantRow::into_variant))
    }

    async fn find_by_id_for_update(&self, id: &VariantId) -> AppResult<Option<ProductVariant>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        // 排他行锁：持有至本事务提交或回滚
        let row = sqlx::query_as::<_, ProductVariantRow>(
            r#"
            SELECT id, sku, stock, created_at, created_by, updated_at, updated_by
            FROM product_variants
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to lock variant: {}", e)))?;

        Ok(row.map(ProductVariantRow::into_variant))
    }

    async fn save(&self, variant: &ProductVariant) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO product_variants (id, sku, stock, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(variant.id.0)
        .bind(&variant.sku)
        .bind(variant.stock)
        .bind(variant.audit_info.created_at)
        .bind(variant.audit_info.created_by.as_ref().map(|a| a.0))
        .bind(variant.audit_info.updated_at)
        .bind(variant.audit_info.updated_by.as_ref().map(|a| a.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to save variant: {}", e)))?;

        Ok(())
    }

    async fn update(&self, variant: &ProductVariant) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result = sqlx::query(
            r#"
            UPDATE product_variants
            SET sku = $2, stock = $3, updated_at = $4, updated_by = $5
            WHERE id = $1
            "#,
        )
        .bind(variant.id.0)
        .bind(&variant.sku)
        .bind(variant.stock)
        .bind(variant.audit_info.updated_at)
        .bind(variant.audit_info.updated_by.as_ref().map(|a| a.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update variant: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Product variant not found"));
        }

        Ok(())
    }
}

// =============================================================================
// StockMovementRepository 实现
// =============================================================================

#[async_trait]
impl StockMovementRepository for TxStockMovementRepository {
    async fn append(&self, movement: &StockMovement) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO stock_movements (id, variant_id, change, movement_type, related_id, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(movement.id.0)
        .bind(movement.variant_id.0)
        .bind(movement.change)
        .bind(movement.movement_type.as_str())
        .bind(movement.related_id)
        .bind(&movement.note)
        .bind(movement.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to append stock movement: {}", e)))?;

        Ok(())
    }

    async fn find_by_variant(
        &self,
        variant_id: &VariantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<StockMovement>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM stock_movements WHERE variant_id = $1")
                .bind(variant_id.0)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to count stock movements: {}", e))
                })?;

        let rows = sqlx::query_as::<_, StockMovementRow>(
            r#"
            SELECT id, variant_id, change, movement_type, related_id, note, created_at
            FROM stock_movements
            WHERE variant_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(variant_id.0)
        .bind(pagination.page_size as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list stock movements: {}", e)))?;

        let movements = rows
            .into_iter()
            .map(StockMovementRow::into_movement)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PagedResult::new(movements, total.0 as u64, pagination))
    }

    async fn sum_changes(&self, variant_id: &VariantId) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let sum: (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(change), 0)::BIGINT FROM stock_movements WHERE variant_id = $1")
                .bind(variant_id.0)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to sum stock movements: {}", e)))?;

        Ok(sum.0)
    }
}
