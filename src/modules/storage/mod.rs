//! Storage module for document files
//!
//! Provides the `ObjectStorage` seam and its MinIO/S3-compatible implementation.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

/// Object store holding uploaded document files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Full object key for a path inside the publicly readable prefix
    fn generate_key(&self, path: &str) -> String;

    /// URL the browser can open for `key`
    fn file_url(&self, key: &str) -> String;

    /// Store `data` under `key`, returning the key
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<String, AppError>;

    /// Fetch an object and its content type
    async fn download(&self, key: &str) -> Result<(Vec<u8>, String), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
