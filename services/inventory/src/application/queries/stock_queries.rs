//! Stock queries

use common::{PagedResult, Pagination};
use cqrs_core::Query;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{ProductVariant, StockMovement};
use crate::domain::value_objects::VariantId;

/// 查询单个变体
#[derive(Debug, Clone)]
pub struct GetVariantQuery {
    pub variant_id: VariantId,
}

impl Query for GetVariantQuery {
    type Result = ProductVariant;
}

/// 分页查询变体的库存流水
#[derive(Debug, Clone)]
pub struct ListStockMovementsQuery {
    pub variant_id: VariantId,
    pub pagination: Pagination,
}

impl Query for ListStockMovementsQuery {
    type Result = PagedResult<StockMovement>;
}

/// 变体库存对账
#[derive(Debug, Clone)]
pub struct ReconcileVariantQuery {
    pub variant_id: VariantId,
}

impl Query for ReconcileVariantQuery {
    type Result = StockReconciliation;
}

/// 对账结果：当前库存与流水总和的比对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReconciliation {
    pub variant_id: VariantId,
    pub stock: i64,
    pub ledger_total: i64,
}

impl StockReconciliation {
    /// 库存是否与流水一致
    pub fn is_consistent(&self) -> bool {
        self.stock == self.ledger_total
    }
}
