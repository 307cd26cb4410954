//! User profile directory.
//!
//! A profile links an identity-provider subject to the role used for
//! authorization. Profiles are created by administrators ahead of the first
//! login and matched by email until the subject is known.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Own profile |
//! | GET | `/api/admin/users` | List profiles ordered by name |
//! | POST | `/api/admin/users` | Create a profile |
//! | GET | `/api/admin/users/{id}` | Get a profile |
//! | PUT | `/api/admin/users/{id}` | Update name, role and registration number |
//! | DELETE | `/api/admin/users/{id}` | Delete a profile |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::UserService;
