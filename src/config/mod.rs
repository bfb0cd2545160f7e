use std::env;

/// Application configuration, loaded once at startup and threaded through
/// `AppState`. Nothing outside this module and `infrastructure` reads the
/// environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Secret for signing session tokens (HS256)
    pub jwt_secret: String,

    /// Maximum artwork image size in bytes (default: 10 MiB)
    pub max_artwork_size: usize,

    /// Maximum avatar image size in bytes (default: 5 MiB)
    pub max_avatar_size: usize,

    /// Declared content types accepted for uploads
    pub allowed_image_types: Vec<String>,

    /// Asset backend: "local" or "s3"
    pub storage_backend: String,

    /// Root directory for the local asset backend (default: "public")
    pub local_storage_root: String,

    /// S3-compatible endpoint for the remote asset backend
    pub s3_endpoint: Option<String>,
    /// S3 access key
    pub s3_access_key: Option<String>,
    /// S3 secret key
    pub s3_secret_key: Option<String>,
    /// S3 bucket name
    pub s3_bucket: String,
    /// Base URL under which stored objects are publicly reachable.
    /// Falls back to `{s3_endpoint}/{s3_bucket}` when unset.
    pub s3_public_url: Option<String>,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "secret".to_string(),
            max_artwork_size: 10 * 1024 * 1024,
            max_avatar_size: 5 * 1024 * 1024,
            allowed_image_types: vec![
                "image/jpeg".to_string(),
                "image/jpg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
            storage_backend: "local".to_string(),
            local_storage_root: "public".to_string(),
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
            s3_bucket: "gallery".to_string(),
            s3_public_url: None,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            max_artwork_size: env::var("MAX_ARTWORK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_artwork_size),

            max_avatar_size: env::var("MAX_AVATAR_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_avatar_size),

            allowed_image_types: env::var("ALLOWED_IMAGE_TYPES")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_lowercase()).collect())
                .unwrap_or(default.allowed_image_types),

            storage_backend: env::var("STORAGE_BACKEND")
                .map(|v| v.to_lowercase())
                .unwrap_or(default.storage_backend),

            local_storage_root: env::var("LOCAL_STORAGE_ROOT")
                .unwrap_or(default.local_storage_root),

            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_access_key: env::var("S3_ACCESS_KEY").ok(),
            s3_secret_key: env::var("S3_SECRET_KEY").ok(),
            s3_bucket: env::var("S3_BUCKET").unwrap_or(default.s3_bucket),
            s3_public_url: env::var("S3_PUBLIC_URL").ok(),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development and tests (local backend, default limits)
    pub fn development() -> Self {
        Self::default()
    }

    /// The larger of the two upload ceilings, used to size the HTTP body limit.
    pub fn max_upload_size(&self) -> usize {
        self.max_artwork_size.max(self.max_avatar_size)
    }
}
