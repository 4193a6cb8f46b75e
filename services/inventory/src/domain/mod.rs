pub mod entities;
pub mod enums;
pub mod repositories;
pub mod services;
pub mod unit_of_work;
pub mod value_objects;
