mod movement_type;

pub use movement_type::*;
