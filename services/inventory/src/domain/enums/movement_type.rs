//! 库存变动类型枚举

use serde::{Deserialize, Serialize};

/// 库存变动类型
///
/// 标记一次库存变动的业务原因，仅用于审计与报表，不参与校验逻辑。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// 线上销售
    Sale,
    /// 门店 POS 销售
    PosSale,
    /// 手工调整
    Adjustment,
    /// 库存恢复
    Restore,
    /// 订单取消
    Cancel,
    /// 退款
    Refund,
}

impl MovementType {
    /// 持久化用的字符串形式
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "sale",
            MovementType::PosSale => "pos_sale",
            MovementType::Adjustment => "adjustment",
            MovementType::Restore => "restore",
            MovementType::Cancel => "cancel",
            MovementType::Refund => "refund",
        }
    }

    /// 是否为消耗库存的销售类变动
    pub fn is_sale(&self) -> bool {
        matches!(self, MovementType::Sale | MovementType::PosSale)
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MovementType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "sale" => Ok(MovementType::Sale),
            "pos_sale" => Ok(MovementType::PosSale),
            "adjustment" => Ok(MovementType::Adjustment),
            "restore" => Ok(MovementType::Restore),
            "cancel" => Ok(MovementType::Cancel),
            "refund" => Ok(MovementType::Refund),
            other => Err(format!("Unknown movement type: {}", other)),
        }
    }
}
