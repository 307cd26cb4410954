/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum number of rows returned in a dashboard alert list
pub const MAX_ALERTS: i64 = 20;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Administrator role - full access to every area and the user directory
pub const ROLE_ADMIN: &str = "admin";

/// Metrologist role - manages calibration certificates
pub const ROLE_METROLOGIST: &str = "metrologist";

/// Chemist role - manages FISPQ safety sheets and emergency sheets
pub const ROLE_CHEMIST: &str = "chemist";

// =============================================================================
// FISPQ IMPORT
// =============================================================================

/// Maximum number of rows accepted by one import request
pub const MAX_IMPORT_ROWS: usize = 1000;

/// Days added to the import date when a row has no expiration date
pub const IMPORT_DEFAULT_VALIDITY_DAYS: u64 = 365;

pub const IMPORT_DEFAULT_PRODUCT: &str = "Unnamed product";
pub const IMPORT_DEFAULT_MANUFACTURER: &str = "Not specified";
pub const IMPORT_DEFAULT_SECTOR: &str = "General";
pub const IMPORT_DEFAULT_RISK_TYPE: &str = "Unclassified";
