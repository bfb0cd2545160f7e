use std::path::Path;

use crate::config::AppConfig;
use crate::services::storage::AssetCategory;
use chrono::Utc;

/// Upload limits and the image type allow-list, snapshotted from `AppConfig`
/// when an asset backend is built.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_types: Vec<String>,
    pub max_artwork_size: usize,
    pub max_avatar_size: usize,
}

impl UploadPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            allowed_types: config.allowed_image_types.clone(),
            max_artwork_size: config.max_artwork_size,
            max_avatar_size: config.max_avatar_size,
        }
    }

    pub fn max_size(&self, category: AssetCategory) -> usize {
        match category {
            AssetCategory::Artwork => self.max_artwork_size,
            AssetCategory::Avatar => self.max_avatar_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates upload size against the category ceiling
pub fn validate_image_size(
    size: usize,
    category: AssetCategory,
    policy: &UploadPolicy,
) -> Result<(), ValidationError> {
    let max = policy.max_size(category);
    if size > max {
        return Err(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!("File size exceeds {}MB limit", max / 1024 / 1024),
        });
    }
    Ok(())
}

/// Validates the declared content type against the allow-list, then sniffs
/// the magic bytes: content that identifies as something outside the
/// allow-list is rejected even when the declared type looks fine.
pub fn validate_image_type(
    declared: Option<&str>,
    data: &[u8],
    policy: &UploadPolicy,
) -> Result<(), ValidationError> {
    let declared = declared.unwrap_or_default();
    let normalized = declared
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().to_lowercase())
        .unwrap_or_default();

    if !policy.allowed_types.iter().any(|t| t == &normalized) {
        return Err(ValidationError {
            code: "INVALID_FILE_TYPE",
            message: "Invalid file type. Only images are allowed.".to_string(),
        });
    }

    if let Some(kind) = infer::get(data) {
        let detected = kind.mime_type();
        if !policy.allowed_types.iter().any(|t| t == detected) {
            return Err(ValidationError {
                code: "CONTENT_TYPE_MISMATCH",
                message: format!("File content identifies as '{}', not an allowed image", detected),
            });
        }
    }

    Ok(())
}

/// Full pre-persist check, run by every asset backend before writing a byte.
pub fn validate_image_upload(
    declared: Option<&str>,
    data: &[u8],
    category: AssetCategory,
    policy: &UploadPolicy,
) -> Result<(), ValidationError> {
    validate_image_type(declared, data, policy)?;
    validate_image_size(data.len(), category, policy)?;
    Ok(())
}

/// Strips any path component and replaces every character outside
/// `[a-zA-Z0-9.-]` with `_`, defeating traversal and shell-unsafe names.
pub fn sanitize_filename(filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        sanitized
    }
}

/// Sanitized filename made unique by a millisecond-timestamp prefix, so two
/// uploads of `cat.png` never collide.
pub fn unique_object_name(filename: &str) -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(filename)
    )
}
