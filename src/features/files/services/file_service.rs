use chrono::{Datelike, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{get_extension_from_content_type, DocumentFolder};
use crate::features::files::form::UploadedFile;
use crate::modules::storage::ObjectStorage;

/// Location of a stored document file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
}

/// Service for document file storage
pub struct FileService {
    storage: Arc<dyn ObjectStorage>,
}

impl FileService {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Validate and upload a file into the folder of its document type
    ///
    /// Keys look like `{prefix}/{folder}/{year}/{uuid}.{ext}`.
    pub async fn store(&self, folder: DocumentFolder, file: UploadedFile) -> Result<StoredFile> {
        file.validate()?;

        let extension = get_extension_from_content_type(&file.content_type).unwrap_or("bin");
        let path = format!(
            "{}/{}/{}.{}",
            folder.as_str(),
            Utc::now().year(),
            Uuid::new_v4(),
            extension
        );
        let key = self.storage.generate_key(&path);
        let file_size = file.data.len() as i64;

        self.storage
            .upload(&key, file.data, &file.content_type)
            .await?;

        let url = self.storage.file_url(&key);
        info!(
            "Stored file: key={}, original_filename={}, size={}",
            key, file.file_name, file_size
        );

        Ok(StoredFile {
            key,
            url,
            original_filename: file.file_name,
            content_type: file.content_type,
            file_size,
        })
    }

    /// Remove a stored object, logging instead of failing
    pub async fn remove_best_effort(&self, key: Option<&str>) {
        let Some(key) = key else {
            return;
        };

        match self.storage.delete(key).await {
            Ok(()) => debug!("Removed stored file '{}'", key),
            Err(e) => warn!("Failed to remove stored file '{}': {}", key, e),
        }
    }

    /// Fetch a stored document file for inline viewing
    pub async fn open(&self, key: &str) -> Result<(Vec<u8>, String)> {
        if self.folder_of(key).is_none() {
            return Err(AppError::BadRequest(format!("Invalid file key '{}'", key)));
        }

        self.storage.download(key).await
    }

    /// Document folder a key belongs to; only such keys may be read back
    pub fn folder_of(&self, key: &str) -> Option<DocumentFolder> {
        if key.contains("..") || key.contains('\\') {
            return None;
        }

        [
            DocumentFolder::Fispqs,
            DocumentFolder::EmergencySheets,
            DocumentFolder::Certificates,
        ]
        .into_iter()
        .find(|folder| {
            let prefix = self.storage.generate_key(&format!("{}/", folder.as_str()));
            key.starts_with(&prefix) && key.len() > prefix.len()
        })
    }
}
