//! 库存流水实体

use chrono::{DateTime, Utc};
use domain_core::Entity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::enums::MovementType;
use crate::domain::value_objects::{StockMovementId, VariantId};

/// 库存流水
///
/// 一次库存变动的不可变审计记录，只追加，永不修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: StockMovementId,
    pub variant_id: VariantId,
    pub change: i64,
    pub movement_type: MovementType,
    pub related_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn new(variant_id: VariantId, change: i64, movement_type: MovementType) -> Self {
        Self {
            id: StockMovementId::new(),
            variant_id,
            change,
            movement_type,
            related_id: None,
            note: None,
            created_at: Utc::now(),
        }
    }

    /// 关联触发此变动的业务实体（订单、取消单等）
    pub fn with_related_id(mut self, related_id: Uuid) -> Self {
        self.related_id = Some(related_id);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// 是否为入库方向
    pub fn is_inbound(&self) -> bool {
        self.change > 0
    }
}

impl Entity for StockMovement {
    type Id = StockMovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// ============================================================
// 单元测试
// ============================================================
