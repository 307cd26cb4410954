use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

/// Storage folder for each document type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DocumentFolder {
    #[serde(rename = "fispqs")]
    Fispqs,
    #[serde(rename = "emergency-sheets")]
    EmergencySheets,
    #[serde(rename = "certificates")]
    Certificates,
}

impl DocumentFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFolder::Fispqs => "fispqs",
            DocumentFolder::EmergencySheets => "emergency-sheets",
            DocumentFolder::Certificates => "certificates",
        }
    }
}

impl FromStr for DocumentFolder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fispqs" => Ok(DocumentFolder::Fispqs),
            "emergency-sheets" => Ok(DocumentFolder::EmergencySheets),
            "certificates" => Ok(DocumentFolder::Certificates),
            other => Err(format!(
                "Unknown folder '{}'. Expected one of: fispqs, emergency-sheets, certificates",
                other
            )),
        }
    }
}

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload (PDF, JPEG or PNG)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Target folder: "fispqs", "emergency-sheets" or "certificates"
    #[schema(example = "fispqs")]
    pub folder: String,
}

/// Response DTO for file uploads
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    /// Object key inside the bucket
    pub key: String,
    /// URL to access the file
    pub url: String,
    /// Original filename as uploaded
    pub original_filename: String,
    /// MIME type of the file
    pub content_type: String,
    /// Size of the file in bytes
    pub file_size: i64,
}

/// Query params for viewing a stored file
#[derive(Debug, Deserialize, IntoParams)]
pub struct ViewFileQuery {
    /// Object key returned by the upload endpoint
    pub key: String,
}

/// Allowed MIME types for document files
pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Get file extension from content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "application/pdf" => Some("pdf"),
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_round_trips_through_str() {
        for folder in [
            DocumentFolder::Fispqs,
            DocumentFolder::EmergencySheets,
            DocumentFolder::Certificates,
        ] {
            assert_eq!(folder.as_str().parse::<DocumentFolder>(), Ok(folder));
        }
        assert!("reports".parse::<DocumentFolder>().is_err());
    }

    #[test]
    fn test_mime_types() {
        assert!(is_mime_type_allowed("application/pdf"));
        assert!(!is_mime_type_allowed("text/html"));
        assert_eq!(get_extension_from_content_type("image/png"), Some("png"));
        assert_eq!(get_extension_from_content_type("image/gif"), None);
    }
}
