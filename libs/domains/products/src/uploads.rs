//! Storage for uploaded product images.

use core_config::uploads::UploadConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::ImageUpload;

/// URL prefix the upload directory is served under
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Writes images into a directory under generated names.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_file_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_file_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_file_bytes,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.dir.clone(), config.max_file_bytes)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
    }

    /// Create the upload directory if it does not exist.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Validate and store an image. Returns its public path, `/uploads/<uuid>.<ext>`.
    pub async fn save(&self, upload: ImageUpload) -> ProductResult<String> {
        let extension = image_extension(&upload).ok_or_else(|| {
            ProductError::Validation(
                "Unsupported image type; allowed types are JPEG, PNG, GIF and WebP".to_string(),
            )
        })?;

        if upload.bytes.is_empty() {
            return Err(ProductError::Validation("Uploaded image is empty".to_string()));
        }

        if upload.bytes.len() > self.max_file_bytes {
            return Err(ProductError::Validation(format!(
                "Image exceeds the maximum size of {}",
                format_size(self.max_file_bytes)
            )));
        }

        let file_name = format!("{}.{extension}", Uuid::now_v7());
        tokio::fs::write(self.dir.join(&file_name), &upload.bytes)
            .await
            .map_err(|e| ProductError::Storage(format!("writing {file_name}: {e}")))?;

        info!(file = %file_name, bytes = upload.bytes.len(), "Stored uploaded image");
        Ok(format!("{UPLOADS_PREFIX}{file_name}"))
    }

    /// Delete the file behind a stored reference, if it is a local upload.
    ///
    /// Failures are logged, never returned.
    pub async fn remove(&self, reference: &str) {
        let Some(file_name) = local_file_name(reference) else {
            return;
        };

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => info!(file = %file_name, "Removed uploaded image"),
            Err(e) => warn!(file = %file_name, error = %e, "Failed to remove uploaded image"),
        }
    }
}

/// File name of a `/uploads/<name>` reference.
///
/// Anything else, including names that could escape the directory, yields `None`.
pub fn local_file_name(reference: &str) -> Option<&str> {
    let name = reference.strip_prefix(UPLOADS_PREFIX)?;
    let safe = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\']);
    safe.then_some(name)
}

/// Extension for an accepted image, from the content type or else the file name.
fn image_extension(upload: &ImageUpload) -> Option<&'static str> {
    if let Some(content_type) = &upload.content_type {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => return Some("jpg"),
            "image/png" => return Some("png"),
            "image/gif" => return Some("gif"),
            "image/webp" => return Some("webp"),
            "" | "application/octet-stream" => {}
            _ => return None,
        }
    }

    let extension = Path::new(upload.file_name.as_deref()?)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        _ => None,
    }
}

fn format_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Pick the image reference to persist.
///
/// A fresh upload wins, then a non-blank supplied URL, then `existing`
/// (which callers pass only on update).
pub fn resolve_image_reference(
    uploaded: Option<String>,
    supplied_url: Option<&str>,
    existing: Option<String>,
) -> Option<String> {
    uploaded
        .or_else(|| {
            supplied_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
        })
        .or(existing)
}
