pub mod commands;
mod handler;
pub mod queries;

pub use handler::*;
