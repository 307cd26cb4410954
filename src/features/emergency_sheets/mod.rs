//! Emergency response sheets for hazardous products in transport and storage.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/emergency-sheets` | Filtered, paginated list with expiration status |
//! | POST | `/api/emergency-sheets` | Create from a multipart form with the sheet file |
//! | GET | `/api/emergency-sheets/statistics` | Status counts, sectors and risk classes |
//! | GET | `/api/emergency-sheets/{id}` | Get one sheet |
//! | PUT | `/api/emergency-sheets/{id}` | Replace fields and optionally the file |
//! | DELETE | `/api/emergency-sheets/{id}` | Delete the sheet and its file |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::EmergencySheetService;
