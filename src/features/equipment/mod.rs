//! Registry of measuring equipment and its calibration schedule.
//!
//! The next calibration date drives the same expired/expiring/valid status
//! as document expiration. Discarded equipment stays on file but is left out
//! of calibration counts and alerts.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/equipment` | Filtered, paginated list with calibration status |
//! | POST | `/api/equipment` | Register equipment |
//! | GET | `/api/equipment/statistics` | Calibration counts, sectors and types |
//! | GET | `/api/equipment/{id}` | Get one record |
//! | PUT | `/api/equipment/{id}` | Replace every field |
//! | DELETE | `/api/equipment/{id}` | Delete the record |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::EquipmentService;
