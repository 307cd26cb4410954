mod emergency_sheet;

pub use emergency_sheet::*;
