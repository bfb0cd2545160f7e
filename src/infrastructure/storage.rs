use crate::config::AppConfig;
use crate::services::storage::{AssetStore, LocalStorage, S3Storage};
use crate::utils::validation::UploadPolicy;
use anyhow::Context;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

/// Builds the asset backend named by the configuration. This is the only
/// place the choice is made; everything downstream sees `dyn AssetStore`.
pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn AssetStore>> {
    let policy = UploadPolicy::from_config(config);

    match config.storage_backend.as_str() {
        "s3" => {
            let endpoint = config
                .s3_endpoint
                .clone()
                .context("S3_ENDPOINT must be set for the s3 backend")?;
            let access_key = config
                .s3_access_key
                .clone()
                .context("S3_ACCESS_KEY must be set for the s3 backend")?;
            let secret_key = config
                .s3_secret_key
                .clone()
                .context("S3_SECRET_KEY must be set for the s3 backend")?;
            let bucket = config.s3_bucket.clone();

            info!("☁️  S3 Storage: {} (Bucket: {})", endpoint, bucket);

            let aws_config = aws_config::from_env()
                .endpoint_url(&endpoint)
                .region(Region::new("us-east-1"))
                .credentials_provider(aws_sdk_s3::config::Credentials::new(
                    access_key, secret_key, None, None, "static",
                ))
                .load()
                .await;

            let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true)
                .build();

            let client = aws_sdk_s3::Client::from_conf(s3_config);

            // Ensure bucket exists
            match client.head_bucket().bucket(&bucket).send().await {
                Ok(_) => info!("✅ Bucket '{}' is ready", bucket),
                Err(_) => {
                    info!("🪣 Bucket '{}' not found, creating...", bucket);
                    if let Err(e) = client.create_bucket().bucket(&bucket).send().await {
                        tracing::error!("❌ Failed to create bucket '{}': {}", bucket, e);
                    } else {
                        info!("✅ Bucket '{}' created successfully", bucket);
                    }
                }
            }

            let public_base_url = config.s3_public_url.clone().unwrap_or_else(|| {
                format!("{}/{}", endpoint.trim_end_matches('/'), bucket)
            });

            Ok(Arc::new(S3Storage::new(
                client,
                bucket,
                public_base_url,
                policy,
            )))
        }
        _ => {
            info!("💾 Local Storage: {}/uploads", config.local_storage_root);
            tokio::fs::create_dir_all(
                std::path::Path::new(&config.local_storage_root).join("uploads/avatars"),
            )
            .await
            .context("failed to create local upload directories")?;

            Ok(Arc::new(LocalStorage::new(
                config.local_storage_root.clone(),
                policy,
            )))
        }
    }
}
