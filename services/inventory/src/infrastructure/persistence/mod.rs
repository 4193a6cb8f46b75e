mod memory;
mod postgres_unit_of_work;
mod rows;
mod tx_repositories;

pub use memory::*;
pub use postgres_unit_of_work::*;
pub use rows::*;
pub use tx_repositories::*;
