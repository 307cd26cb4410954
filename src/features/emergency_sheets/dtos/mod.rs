mod emergency_sheet_dto;

pub use emergency_sheet_dto::*;
