//! 商品变体实体

use domain_core::{AggregateRoot, AuditInfo, Entity};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::VariantId;

/// 商品变体
///
/// `stock` 只能通过库存服务变更，任何已提交状态下都满足 `stock >= 0`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub sku: String,
    pub stock: i64,
    pub audit_info: AuditInfo,
}

impl ProductVariant {
    pub fn new(sku: impl Into<String>, stock: i64) -> Self {
        Self {
            id: VariantId::new(),
            sku: sku.into(),
            stock,
            audit_info: AuditInfo::default(),
        }
    }

    /// 是否还有可售库存
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// 写入新的库存水平并刷新审计信息
    pub fn set_stock(&mut self, stock: i64) {
        self.stock = stock;
        self.audit_info.update(None);
    }
}

impl Entity for ProductVariant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for ProductVariant {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

// ============================================================
// 单元测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_variant() {
        let variant = ProductVariant::new("TSHIRT-RED-M", 12);

        assert_eq!(variant.sku, "TSHIRT-RED-M");
        assert_eq!(variant.stock, 12);
        assert!(variant.in_stock());
    }

    #[test]
    fn test_set_stock_refreshes_audit() {
        let mut variant = ProductVariant::new("TSHIRT-RED-M", 5);
        let created_at = variant.audit_info.created_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        variant.set_stock(2);

        assert_eq!(variant.stock, 2);
        assert_eq!(variant.audit_info.created_at, created_at);
        assert!(variant.audit_info.updated_at > created_at);
    }

    #[test]
    fn test_out_of_stock() {
        let variant = ProductVariant::new("TSHIRT-RED-M", 0);
        assert!(!variant.in_stock());
    }
}
