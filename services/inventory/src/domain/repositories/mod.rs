mod stock_movement_repository;
mod variant_repository;

pub use stock_movement_repository::*;
pub use variant_repository::*;
