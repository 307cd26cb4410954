mod certificate_handler;

pub use certificate_handler::*;
