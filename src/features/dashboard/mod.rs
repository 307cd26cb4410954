//! Role dashboards: expiration summaries, user counts and renewal alerts.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/dashboard/admin` | Every document type and equipment, users per role, alerts (admin) |
//! | GET | `/api/dashboard/chemistry` | FISPQ and emergency sheet summaries, alerts |
//! | GET | `/api/dashboard/metrology` | Certificate and equipment summaries, recent certificates, alerts |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::DashboardService;
