mod emergency_sheet_service;

pub use emergency_sheet_service::EmergencySheetService;
