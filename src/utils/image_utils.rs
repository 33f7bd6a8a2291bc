// utils/image_utils.rs
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image data is empty")]
    Empty,

    #[error("Failed to decode base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Image exceeds the {0}MB upload limit")]
    TooLarge(usize),

    #[error("Failed to save image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where uploaded images live. Sub-folders separate listing photos, payment
/// proofs and identity documents.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_size_mb: usize,
}

pub const LISTINGS_FOLDER: &str = "listings";
pub const PROOFS_FOLDER: &str = "proofs";
pub const VERIFICATIONS_FOLDER: &str = "verifications";

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_size_mb: usize) -> Self {
        ImageStore {
            root: root.into(),
            max_size_mb,
        }
    }

    /// Saves one base64 image as `{folder}/{stem}_{index}.{ext}` and returns
    /// that relative path.
    pub async fn save(
        &self,
        base64_data: &str,
        folder: &str,
        stem: &str,
        index: usize,
    ) -> Result<String, ImageError> {
        let (extension, clean_data) = split_data_url(base64_data);
        if clean_data.trim().is_empty() {
            return Err(ImageError::Empty);
        }

        if !validate_image_size(clean_data, self.max_size_mb) {
            return Err(ImageError::TooLarge(self.max_size_mb));
        }

        let bytes = STANDARD.decode(clean_data.trim())?;

        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| ImageError::Io { path: dir.clone(), source })?;

        let relative = format!("{}/{}_{}.{}", folder, stem, index, extension);
        let path = self.root.join(&relative);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| ImageError::Io { path, source })?;

        Ok(relative)
    }

    /// Deletes a previously saved image. Failures are only logged.
    pub async fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove image {}: {}", path.display(), e);
        }
    }

    /// Saves every image, skipping the ones that fail. Returns the saved
    /// paths in upload order.
    pub async fn save_all(&self, images: &[String], folder: &str, stem: &str) -> Vec<String> {
        let mut saved = Vec::with_capacity(images.len());
        for (index, data) in images.iter().enumerate() {
            match self.save(data, folder, stem, index).await {
                Ok(path) => saved.push(path),
                Err(e) => {
                    tracing::warn!("Skipping image {} for {}/{}: {}", index, folder, stem, e);
                }
            }
        }
        saved
    }
}

/// Strips a `data:image/...;base64,` prefix if present and picks the file
/// extension from it (jpg otherwise).
fn split_data_url(data: &str) -> (&'static str, &str) {
    if !data.starts_with("data:image") {
        return ("jpg", data);
    }

    let (header, body) = data.split_once(',').unwrap_or((data, ""));
    let extension = if header.contains("image/png") {
        "png"
    } else if header.contains("image/webp") {
        "webp"
    } else if header.contains("image/gif") {
        "gif"
    } else {
        "jpg"
    };
    (extension, body)
}

pub fn validate_image_size(base64_data: &str, max_size_mb: usize) -> bool {
    let size_in_bytes = (base64_data.len() * 3) / 4; // Approximate base64 size
    size_in_bytes <= max_size_mb * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_data_url() {
        assert_eq!(split_data_url("data:image/png;base64,AAAA"), ("png", "AAAA"));
        assert_eq!(split_data_url("data:image/jpeg;base64,AAAA"), ("jpg", "AAAA"));
        assert_eq!(split_data_url("AAAA"), ("jpg", "AAAA"));
    }

    #[tokio::test]
    async fn test_save_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 5);
        let data = format!("data:image/png;base64,{}", STANDARD.encode(b"fake png"));

        let path = store.save(&data, LISTINGS_FOLDER, "abc", 2).await.unwrap();

        assert_eq!(path, "listings/abc_2.png");
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), b"fake png");
    }

    #[tokio::test]
    async fn test_save_all_skips_broken_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 5);
        let images = vec![
            STANDARD.encode(b"one"),
            "!!not base64!!".to_string(),
            STANDARD.encode(b"three"),
        ];

        let saved = store.save_all(&images, LISTINGS_FOLDER, "abc").await;

        assert_eq!(saved, vec!["listings/abc_0.jpg", "listings/abc_2.jpg"]);
    }

    #[test]
    fn test_validate_image_size() {
        assert!(validate_image_size("AAAA", 1));
        assert!(!validate_image_size(&"A".repeat(2 * 1024 * 1024), 1));
    }
}
