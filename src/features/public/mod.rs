//! Read-only public consultation of safety sheets and equipment. No authentication.
//!
//! Records are trimmed to what a visitor needs; authors and storage keys stay private.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/public/fispqs` | Filtered FISPQ list with expiration status |
//! | GET | `/api/public/emergency-sheets` | Filtered emergency sheet list with expiration status |
//! | GET | `/api/public/equipment` | Filtered equipment list with calibration status |
//! | GET | `/api/public/statistics` | Totals, sectors and expiring counts per type |

pub mod dto;
pub mod handler;
pub mod routes;

pub use routes::{routes, PublicState};
