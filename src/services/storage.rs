use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::utils::validation::{self, UploadPolicy};

/// Namespace an asset is stored under; each carries its own size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCategory {
    Artwork,
    Avatar,
}

impl AssetCategory {
    pub fn prefix(&self) -> &'static str {
        match self {
            AssetCategory::Artwork => "artworks",
            AssetCategory::Avatar => "avatars",
        }
    }
}

/// A successfully stored asset: the locator goes into the database, the
/// object name is echoed back to the client.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub locator: String,
    pub filename: String,
}

#[derive(Error, Debug)]
pub enum AssetStoreError {
    /// Size or type check failed before anything was written (maps to 400)
    #[error("{0}")]
    Rejected(String),

    /// The backend itself failed (maps to 500)
    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Binary storage for uploaded images, with the backend fixed at startup.
///
/// `put` validates type and size before persisting anything. `delete` is
/// best-effort by contract: a locator that does not resolve to an object in
/// this backend completes silently, because asset deletion is always a side
/// effect of a database deletion that must proceed regardless.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn put(
        &self,
        category: AssetCategory,
        original_filename: &str,
        declared_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<StoredAsset, AssetStoreError>;

    async fn delete(&self, locator: &str) -> Result<()>;
}

/// Writes under `{root}/uploads[/avatars]`; locators are root-relative paths
/// like `/uploads/1700000000000-cat.png`.
pub struct LocalStorage {
    root: PathBuf,
    policy: UploadPolicy,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, policy: UploadPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    fn category_dir(category: AssetCategory) -> &'static str {
        match category {
            AssetCategory::Artwork => "uploads",
            AssetCategory::Avatar => "uploads/avatars",
        }
    }

    /// Maps a locator back to a path under the root, refusing anything that
    /// escapes it.
    fn resolve_locator(&self, locator: &str) -> Option<PathBuf> {
        let relative = locator.strip_prefix('/')?;
        let path = Path::new(relative);
        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(path))
    }
}

#[async_trait]
impl AssetStore for LocalStorage {
    async fn put(
        &self,
        category: AssetCategory,
        original_filename: &str,
        declared_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<StoredAsset, AssetStoreError> {
        validation::validate_image_upload(declared_type, &data, category, &self.policy)
            .map_err(|e| AssetStoreError::Rejected(e.to_string()))?;

        let filename = validation::unique_object_name(original_filename);
        let dir = self.root.join(Self::category_dir(category));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AssetStoreError::Backend(e.into()))?;
        tokio::fs::write(dir.join(&filename), &data)
            .await
            .map_err(|e| AssetStoreError::Backend(e.into()))?;

        Ok(StoredAsset {
            locator: format!("/{}/{}", Self::category_dir(category), filename),
            filename,
        })
    }

    async fn delete(&self, locator: &str) -> Result<()> {
        let Some(path) = self.resolve_locator(locator) else {
            tracing::warn!("Unresolvable local asset locator, skipping: {}", locator);
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Uploads to an S3-compatible image host; locators are absolute public URLs.
pub struct S3Storage {
    client: Client,
    bucket: String,
    public_base_url: String,
    policy: UploadPolicy,
}

impl S3Storage {
    pub fn new(
        client: Client,
        bucket: String,
        public_base_url: String,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    fn key_from_locator(&self, locator: &str) -> Option<String> {
        locator
            .strip_prefix(&self.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .map(|key| key.to_string())
    }
}

#[async_trait]
impl AssetStore for S3Storage {
    async fn put(
        &self,
        category: AssetCategory,
        original_filename: &str,
        declared_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<StoredAsset, AssetStoreError> {
        validation::validate_image_upload(declared_type, &data, category, &self.policy)
            .map_err(|e| AssetStoreError::Rejected(e.to_string()))?;

        let filename = validation::unique_object_name(original_filename);
        let key = format!("{}/{}", category.prefix(), filename);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data));
        if let Some(content_type) = declared_type {
            request = request.content_type(content_type);
        }
        request
            .send()
            .await
            .map_err(|e| AssetStoreError::Backend(e.into()))?;

        Ok(StoredAsset {
            locator: format!("{}/{}", self.public_base_url, key),
            filename,
        })
    }

    async fn delete(&self, locator: &str) -> Result<()> {
        let Some(key) = self.key_from_locator(locator) else {
            tracing::warn!("Locator outside our namespace, skipping: {}", locator);
            return Ok(());
        };

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await?;
        Ok(())
    }
}
