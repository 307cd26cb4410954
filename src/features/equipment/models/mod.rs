mod equipment;

pub use equipment::*;
