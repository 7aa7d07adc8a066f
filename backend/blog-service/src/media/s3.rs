use super::{MediaStore, MediaUpload};
use crate::config::MediaConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, error};
use uuid::Uuid;

/// S3-backed thumbnail store
#[derive(Clone)]
pub struct S3MediaStore {
    client: Client,
    bucket: String,
    region: String,
    base_url: Option<String>,
    path_style: bool,
    max_upload_bytes: usize,
}

impl S3MediaStore {
    pub fn new(client: Client, bucket: String, config: &MediaConfig) -> Self {
        Self {
            client,
            bucket,
            region: config.region.clone(),
            base_url: config.base_url.clone(),
            path_style: config.path_style,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Build a store from config. Returns `None` when no bucket is configured.
    pub async fn from_config(config: &MediaConfig) -> Option<Self> {
        let bucket = config.bucket.clone()?;

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.path_style)
            .build();

        Some(Self::new(Client::from_conf(s3_config), bucket, config))
    }

    /// Public URL of an object
    pub fn object_url(&self, key: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None if self.path_style => format!(
                "https://s3.{}.amazonaws.com/{}/{}",
                self.region, self.bucket, key
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

/// Object key for a thumbnail: `thumbnails/{post_id}/{random}.{ext}`
pub fn thumbnail_key(post_id: Uuid, upload: &MediaUpload) -> String {
    format!(
        "thumbnails/{}/{}.{}",
        post_id,
        Uuid::new_v4(),
        upload.extension()
    )
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn store_thumbnail(&self, post_id: Uuid, upload: MediaUpload) -> Result<String> {
        upload.validate(self.max_upload_bytes)?;

        let key = thumbnail_key(post_id, &upload);
        let size = upload.bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(&upload.content_type)
            .body(ByteStream::from(upload.bytes))
            .send()
            .await
            .map_err(|e| {
                error!(%post_id, key = %key, "S3 upload failed: {}", DisplayErrorContext(&e));
                AppError::MediaError(e.to_string())
            })?;

        debug!(%post_id, key = %key, size, "thumbnail uploaded");
        Ok(self.object_url(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media_config(base_url: Option<&str>, path_style: bool) -> MediaConfig {
        MediaConfig {
            bucket: Some("blog-media".to_string()),
            region: "eu-west-1".to_string(),
            base_url: base_url.map(str::to_string),
            path_style,
            max_upload_bytes: 1024,
        }
    }

    fn store(config: &MediaConfig) -> S3MediaStore {
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .build();
        S3MediaStore::new(
            Client::from_conf(s3_config),
            "blog-media".to_string(),
            config,
        )
    }

    #[test]
    fn test_object_url_uses_cdn_base() {
        let store = store(&media_config(Some("https://cdn.example.com/"), false));
        assert_eq!(
            store.object_url("thumbnails/a.png"),
            "https://cdn.example.com/thumbnails/a.png"
        );
    }

    #[test]
    fn test_object_url_virtual_hosted_and_path_style() {
        let virtual_hosted = store(&media_config(None, false));
        assert_eq!(
            virtual_hosted.object_url("k.png"),
            "https://blog-media.s3.eu-west-1.amazonaws.com/k.png"
        );

        let path_style = store(&media_config(None, true));
        assert_eq!(
            path_style.object_url("k.png"),
            "https://s3.eu-west-1.amazonaws.com/blog-media/k.png"
        );
    }

    #[test]
    fn test_thumbnail_key_layout() {
        let post_id = Uuid::new_v4();
        let upload = MediaUpload {
            filename: Some("cover.jpg".to_string()),
            content_type: "image/jpeg".to_string(),
            bytes: vec![1],
        };
        let key = thumbnail_key(post_id, &upload);
        assert!(key.starts_with(&format!("thumbnails/{}/", post_id)));
        assert!(key.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_rejects_non_image_before_upload() {
        let store = store(&media_config(None, false));
        let err = store
            .store_thumbnail(
                Uuid::new_v4(),
                MediaUpload {
                    filename: Some("notes.txt".to_string()),
                    content_type: "text/plain".to_string(),
                    bytes: b"hello".to_vec(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
