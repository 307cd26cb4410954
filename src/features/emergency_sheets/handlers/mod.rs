mod emergency_sheet_handler;

pub use emergency_sheet_handler::*;
