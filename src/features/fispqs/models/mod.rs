mod fispq;

pub use fispq::*;
