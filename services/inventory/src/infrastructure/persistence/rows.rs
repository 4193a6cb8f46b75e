//! 数据库行结构与转换

use chrono::{DateTime, Utc};
use domain_core::{ActorId, AuditInfo};
use errors::{AppError, AppResult};
use uuid::Uuid;

use crate::domain::entities::{ProductVariant, StockMovement};
use crate::domain::enums::MovementType;
use crate::domain::value_objects::{StockMovementId, VariantId};

/// 归一化存量字段
///
/// 历史数据中 stock 列可能为 NULL；读取时显式归一为 0，
/// 业务层拿到的永远是普通整数。
pub fn normalize_stock(raw: Option<i64>) -> i64 {
    raw.unwrap_or(0)
}

/// product_variants 行
#[derive(Debug, sqlx::FromRow)]
pub struct ProductVariantRow {
    pub id: Uuid,
    pub sku: String,
    pub stock: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl ProductVariantRow {
    pub fn into_variant(self) -> ProductVariant {
        ProductVariant {
            id: VariantId::from_uuid(self.id),
            sku: self.sku,
            stock: normalize_stock(self.stock),
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(ActorId),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(ActorId),
            },
        }
    }
}

/// stock_movements 行
#[derive(Debug, sqlx::FromRow)]
pub struct StockMovementRow {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub change: i64,
    pub movement_type: String,
    pub related_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMovementRow {
    pub fn into_movement(self) -> AppResult<StockMovement> {
        let movement_type =
            MovementType::try_from(self.movement_type.as_str()).map_err(AppError::database)?;

        Ok(StockMovement {
            id: StockMovementId::from_uuid(self.id),
            variant_id: VariantId::from_uuid(self.variant_id),
            change: self.change,
            movement_type,
            related_id: self.related_id,
            note: self.note,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_stock() {
        assert_eq!(normalize_stock(Some(7)), 7);
        assert_eq!(normalize_stock(Some(0)), 0);
        assert_eq!(normalize_stock(None), 0);
    }

    #[test]
    fn test_variant_row_with_null_stock() {
        let now = Utc::now();
        let row = ProductVariantRow {
            id: Uuid::now_v7(),
            sku: "LEGACY-SKU".to_string(),
            stock: None,
            created_at: now,
            created_by: None,
            updated_at: now,
            updated_by: None,
        };

        let variant = row.into_variant();
        assert_eq!(variant.stock, 0);
    }

    #[test]
    fn test_movement_row_conversion() {
        let now = Utc::now();
        let row = StockMovementRow {
            id: Uuid::now_v7(),
            variant_id: Uuid::now_v7(),
            change: -3,
            movement_type: "pos_sale".to_string(),
            related_id: None,
            note: None,
            created_at: now,
        };

        let movement = row.into_movement().unwrap();
        assert_eq!(movement.movement_type, MovementType::PosSale);
        assert_eq!(movement.change, -3);
    }

    #[test]
    fn test_movement_row_unknown_type() {
        let now = Utc::now();
        let row = StockMovementRow {
            id: Uuid::now_v7(),
            variant_id: Uuid::now_v7(),
            change: 1,
            movement_type: "gift".to_string(),
            related_id: None,
            note: None,
            created_at: now,
        };

        assert!(row.into_movement().is_err());
    }
}
