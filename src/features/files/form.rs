//! Multipart document forms: text fields plus an optional `file` part.

use axum::extract::{multipart::MultipartError, Multipart};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{is_mime_type_allowed, ALLOWED_MIME_TYPES, MAX_FILE_SIZE};

/// File part of a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Reject empty, oversized and unsupported files
    pub fn validate(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }

        if self.data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                MAX_FILE_SIZE,
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }

        if !is_mime_type_allowed(&self.content_type) {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                self.content_type,
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }

        Ok(())
    }
}

/// Parsed multipart form
#[derive(Debug, Default)]
pub struct DocumentForm {
    fields: Map<String, Value>,
    pub file: Option<UploadedFile>,
}

impl DocumentForm {
    /// Set a text field; blank values are treated as absent
    pub fn insert_text(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.fields.remove(name);
        } else {
            self.fields
                .insert(name.to_string(), Value::String(value.to_string()));
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Deserialize the text fields into a request DTO
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| AppError::Validation(format!("Invalid form data: {}", e)))
    }

    pub fn take_file(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", e))
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

/// Read every part of a multipart request.
///
/// The part named `file` becomes the uploaded file; every other part is a
/// text field.
pub async fn read_document_form(mut multipart: Multipart) -> Result<DocumentForm> {
    let mut form = DocumentForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unnamed".to_string());
            let data = field.bytes().await.map_err(multipart_error)?;

            // Browsers send an empty part when no file was picked
            if data.is_empty() && file_name.is_empty() {
                continue;
            }

            form.file = Some(UploadedFile {
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else if !name.is_empty() {
            let text = field.text().await.map_err(multipart_error)?;
            form.insert_text(&name, &text);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        product: String,
        cas_number: Option<String>,
    }

    fn file(content_type: &str, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: "sheet.pdf".to_string(),
            content_type: content_type.to_string(),
            data: vec![b'%'; size],
        }
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let mut form = DocumentForm::default();
        form.insert_text("product", "  Acetone ");
        form.insert_text("cas_number", "   ");

        let sample: Sample = form.deserialize().unwrap();
        assert_eq!(sample.product, "Acetone");
        assert_eq!(sample.cas_number, None);
        assert_eq!(form.text("cas_number"), None);
    }

    #[test]
    fn test_missing_required_field_is_validation_error() {
        let form = DocumentForm::default();
        let err = form.deserialize::<Sample>().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("product")));
    }

    #[test]
    fn test_file_validation() {
        assert!(file("application/pdf", 10).validate().is_ok());
        assert!(matches!(
            file("application/pdf", 0).validate(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            file("text/html", 10).validate(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            file("application/pdf", MAX_FILE_SIZE + 1).validate(),
            Err(AppError::PayloadTooLarge(_))
        ));
    }
}
