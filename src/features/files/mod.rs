pub mod dtos;
pub mod form;
pub mod handlers;
pub mod routes;
pub mod services;

pub use form::{read_document_form, UploadedFile};
pub use routes::{routes, MULTIPART_BODY_LIMIT};
pub use services::FileService;
