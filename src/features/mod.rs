pub mod auth;
pub mod certificates;
pub mod dashboard;
pub mod emergency_sheets;
pub mod equipment;
pub mod files;
pub mod fispqs;
pub mod public;
pub mod users;
