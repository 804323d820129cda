//! Object storage for uploaded media (product images, driver documents).
//!
//! Objects are addressed by a timestamp-prefixed filename under a per-purpose
//! folder; the public download URL is returned to the caller, which stores it
//! back onto the owning record. Backends are selected by configuration:
//! local filesystem in deployment, in-memory for development and tests.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload, local::LocalFileSystem, memory::InMemory};
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying object store failure.
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// A data URL could not be decoded.
    #[error("invalid data url: {0}")]
    InvalidDataUrl(String),

    /// The filesystem root could not be opened.
    #[error("storage root unavailable: {0}")]
    Root(String),
}

/// Media storage handle. Cheap to clone.
#[derive(Clone)]
pub struct MediaStorage {
    store: Arc<dyn ObjectStore>,
    media_base_url: String,
}

impl MediaStorage {
    /// Build storage from configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Root` if the filesystem root cannot be opened.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let store: Arc<dyn ObjectStore> = match &config.backend {
            StorageBackend::Filesystem(root) => Arc::new(
                LocalFileSystem::new_with_prefix(root)
                    .map_err(|e| StorageError::Root(e.to_string()))?,
            ),
            StorageBackend::Memory => Arc::new(InMemory::new()),
        };

        Ok(Self {
            store,
            media_base_url: config.media_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// In-memory storage for tests.
    #[must_use]
    pub fn in_memory(media_base_url: &str) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            media_base_url: media_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Upload a blob under `folder`, keyed by a timestamp-prefixed filename,
    /// and return its public download URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ObjectStore` if the write fails.
    pub async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let key = format!(
            "{folder}/{}_{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(filename)
        );
        let path = Path::from(key.clone());

        self.store.put(&path, PutPayload::from(bytes)).await?;

        Ok(format!("{}/{key}", self.media_base_url))
    }

    /// The underlying store, for listing in tests.
    #[cfg(test)]
    fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

/// Keep filenames flat and URL-safe: path separators and whitespace become
/// dashes.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ' ' => '-',
            other => other,
        })
        .collect()
}

/// Decode a `data:` URL into its payload bytes.
///
/// Driver documents may arrive as data URLs from the form instead of raw
/// multipart bytes.
///
/// # Errors
///
/// Returns `StorageError::InvalidDataUrl` for anything that is not a
/// base64-encoded data URL.
pub fn decode_data_url(data_url: &str) -> Result<Bytes, StorageError> {
    use base64::Engine as _;

    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| StorageError::InvalidDataUrl("missing data: prefix".to_string()))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| StorageError::InvalidDataUrl("missing payload".to_string()))?;

    if !meta.ends_with(";base64") {
        return Err(StorageError::InvalidDataUrl(
            "only base64 data urls are supported".to_string(),
        ));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| StorageError::InvalidDataUrl(e.to_string()))?;

    Ok(Bytes::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let storage = MediaStorage::in_memory("https://cdn.terraverde.agr.br/media/");

        let url = storage
            .upload("products", "tomatoes.jpg", Bytes::from_static(b"jpeg"))
            .await
            .expect("upload");

        assert!(url.starts_with("https://cdn.terraverde.agr.br/media/products/"));
        assert!(url.ends_with("_tomatoes.jpg"));
    }

    #[tokio::test]
    async fn test_upload_key_is_timestamp_prefixed() {
        let storage = MediaStorage::in_memory("http://localhost/media");
        storage
            .upload("drivers/licenses", "cnh.png", Bytes::from_static(b"png"))
            .await
            .expect("upload");

        let objects: Vec<_> = storage
            .store()
            .list(Some(&Path::from("drivers/licenses")))
            .try_collect()
            .await
            .expect("list");

        assert_eq!(objects.len(), 1);
        let key = objects[0].location.to_string();
        let name = key.rsplit('/').next().expect("file name");
        let (prefix, rest) = name.split_once('_').expect("timestamp prefix");
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest, "cnh.png");
    }

    #[tokio::test]
    async fn test_upload_sanitizes_filename() {
        let storage = MediaStorage::in_memory("http://localhost/media");
        let url = storage
            .upload("products", "my photo/1.jpg", Bytes::from_static(b"x"))
            .await
            .expect("upload");

        assert!(url.ends_with("_my-photo-1.jpg"));
    }

    #[test]
    fn test_decode_data_url() {
        let bytes = decode_data_url("data:image/png;base64,aGVsbG8=").expect("decode");
        assert_eq!(bytes.as_ref(), b"hello");
    }

    #[test]
    fn test_decode_rejects_plain_strings() {
        assert!(decode_data_url("hello").is_err());
        assert!(decode_data_url("data:image/png,plain").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }
}
