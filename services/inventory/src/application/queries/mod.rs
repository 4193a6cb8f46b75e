mod stock_queries;

pub use stock_queries::*;
