mod equipment_handler;

pub use equipment_handler::*;
