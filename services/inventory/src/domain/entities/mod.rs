mod product_variant;
mod stock_movement;

pub use product_variant::*;
pub use stock_movement::*;
