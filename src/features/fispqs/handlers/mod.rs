mod fispq_handler;

pub use fispq_handler::*;
