//! 服务错误定义

use errors::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Product variant not found")]
    VariantNotFound,

    #[error("Insufficient stock: {available} available, change of {change} requested")]
    InsufficientStock { available: i64, change: i64 },
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::VariantNotFound => AppError::not_found("Product variant not found"),
            InventoryError::InsufficientStock { available, change } => {
                AppError::validation(format!(
                    "Insufficient stock: {} available, change of {} requested",
                    available, change
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_not_found_maps_to_404() {
        let err: AppError = InventoryError::VariantNotFound.into();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_insufficient_stock_maps_to_400() {
        let err: AppError = InventoryError::InsufficientStock {
            available: 2,
            change: -3,
        }
        .into();

        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("2 available"));
    }
}
