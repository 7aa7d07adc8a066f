/// Thumbnail storage
///
/// `MediaStore` turns uploaded bytes into a durable public URL. The S3
/// implementation lives in [`s3`]; services only see the trait.
pub mod s3;

pub use s3::S3MediaStore;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use uuid::Uuid;

/// File received from a multipart form
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub filename: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    /// File extension taken from the original filename, falling back to the MIME subtype
    pub fn extension(&self) -> String {
        self.filename
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .or_else(|| self.content_type.split('/').nth(1))
            .map(|ext| ext.split(';').next().unwrap_or(ext).trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "bin".to_string())
    }

    /// Reject empty, non-image and oversized uploads
    pub fn validate(&self, max_bytes: usize) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(AppError::ValidationError("Uploaded file is empty".to_string()));
        }
        let is_image = self
            .content_type
            .parse::<mime::Mime>()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(AppError::ValidationError(
                "Thumbnail must be an image".to_string(),
            ));
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Thumbnail exceeds the {} byte limit",
                max_bytes
            )));
        }
        Ok(())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist a thumbnail for `post_id` and return its public URL
    async fn store_thumbnail(&self, post_id: Uuid, upload: MediaUpload) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(filename: Option<&str>, content_type: &str, len: usize) -> MediaUpload {
        MediaUpload {
            filename: filename.map(str::to_string),
            content_type: content_type.to_string(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn test_extension_prefers_filename() {
        assert_eq!(upload(Some("cover.PNG"), "image/jpeg", 1).extension(), "png");
        assert_eq!(upload(Some("cover"), "image/jpeg", 1).extension(), "jpeg");
        assert_eq!(upload(None, "image/webp", 1).extension(), "webp");
    }

    #[test]
    fn test_validate() {
        assert!(upload(None, "image/png", 10).validate(10).is_ok());
        assert!(matches!(
            upload(None, "image/png", 0).validate(10),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            upload(None, "application/pdf", 10).validate(10),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            upload(None, "image/png", 11).validate(10),
            Err(AppError::PayloadTooLarge(_))
        ));
    }
}
