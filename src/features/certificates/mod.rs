//! Calibration certificates for measuring equipment.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/certificates` | Filtered, paginated list with expiration status |
//! | POST | `/api/certificates` | Create from a multipart form with the certificate file |
//! | GET | `/api/certificates/statistics` | Status counts, sectors and equipment |
//! | GET | `/api/certificates/next-number` | Preview the next certificate number |
//! | GET | `/api/certificates/{id}` | Get one certificate |
//! | PUT | `/api/certificates/{id}` | Replace fields and optionally the file |
//! | DELETE | `/api/certificates/{id}` | Delete the certificate and its file |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod numbering;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::CertificateService;
