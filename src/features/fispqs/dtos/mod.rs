mod fispq_dto;

pub use fispq_dto::*;
