mod certificate_dto;

pub use certificate_dto::*;
