pub mod constants;
pub mod expiration;
pub mod query;
pub mod test_helpers;
pub mod types;
pub mod validation;
