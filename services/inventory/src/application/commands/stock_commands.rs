//! Stock commands

use cqrs_core::Command;
use errors::{AppError, AppResult};
use uuid::Uuid;

use crate::domain::entities::ProductVariant;
use crate::domain::enums::MovementType;
use crate::domain::value_objects::VariantId;

/// 调整库存命令
#[derive(Debug, Clone)]
pub struct AdjustStockCommand {
    pub variant_id: VariantId,
    /// 变化量：正数入库，负数出库。零是合法的，不会被拒绝。
    pub change: i64,
    pub movement_type: MovementType,
    pub related_id: Option<Uuid>,
    pub note: Option<String>,
}

impl AdjustStockCommand {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(note) = &self.note {
            if note.len() > 500 {
                return Err(AppError::validation("备注长度不能超过500个字符"));
            }
        }

        Ok(())
    }
}

impl Command for AdjustStockCommand {
    type Result = ProductVariant;
}

/// 创建变体命令
#[derive(Debug, Clone)]
pub struct CreateVariantCommand {
    pub sku: String,
    pub initial_stock: i64,
}

impl CreateVariantCommand {
    pub fn validate(&self) -> AppResult<()> {
        if self.sku.is_empty() {
            return Err(AppError::validation("SKU 不能为空"));
        }
        if self.sku.len() > 64 {
            return Err(AppError::validation("SKU 长度不能超过64个字符"));
        }
        if self.initial_stock < 0 {
            return Err(AppError::validation("初始库存不能为负数"));
        }

        Ok(())
    }
}

impl Command for CreateVariantCommand {
    type Result = ProductVariant;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_command_accepts_zero_change() {
        let cmd = AdjustStockCommand {
            variant_id: VariantId::new(),
            change: 0,
            movement_type: MovementType::Adjustment,
            related_id: None,
            note: None,
        };

        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_adjust_command_rejects_oversized_note() {
        let cmd = AdjustStockCommand {
            variant_id: VariantId::new(),
            change: -1,
            movement_type: MovementType::Sale,
            related_id: None,
            note: Some("x".repeat(501)),
        };

        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_create_command_validation() {
        let cmd = CreateVariantCommand {
            sku: String::new(),
            initial_stock: 5,
        };
        assert!(cmd.validate().is_err());

        let cmd = CreateVariantCommand {
            sku: "TSHIRT-RED-M".to_string(),
            initial_stock: -1,
        };
        assert!(cmd.validate().is_err());

        let cmd = CreateVariantCommand {
            sku: "TSHIRT-RED-M".to_string(),
            initial_stock: 5,
        };
        assert!(cmd.validate().is_ok());
    }
}
