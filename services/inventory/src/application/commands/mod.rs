mod stock_commands;

pub use stock_commands::*;
