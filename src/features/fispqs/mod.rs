//! FISPQ chemical safety data sheets.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/fispqs` | Filtered, paginated list with expiration status |
//! | POST | `/api/fispqs` | Create from a multipart form with the sheet file |
//! | GET | `/api/fispqs/statistics` | Status counts, sectors and manufacturers |
//! | POST | `/api/fispqs/import` | Batch import of JSON rows (admin) |
//! | GET | `/api/fispqs/{id}` | Get one sheet |
//! | PUT | `/api/fispqs/{id}` | Replace fields and optionally the file |
//! | DELETE | `/api/fispqs/{id}` | Delete the sheet and its file |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::FispqService;
