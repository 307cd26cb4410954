mod file_handler;

pub use file_handler::{__path_upload_file, __path_view_file, upload_file, view_file};
