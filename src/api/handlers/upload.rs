use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::AppError;
use crate::services::authz::{self, Action};
use crate::services::storage::AssetCategory;
use crate::utils::auth::Claims;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub image_url: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub success: bool,
    pub avatar_url: String,
}

/// Pulls the `file` field out of the multipart body.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<(String, Option<String>, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
            .to_vec();
        return Ok((filename, content_type, data));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = String, description = "Artwork image file", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing file, wrong type, or too large"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account paused")
    ),
    security(("session" = [])),
    tag = "upload"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(&principal, &Action::CreateContent)?;

    let (filename, content_type, data) = read_file_field(&mut multipart).await?;

    let asset = state
        .assets
        .put(
            AssetCategory::Artwork,
            &filename,
            content_type.as_deref(),
            data,
        )
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        filename: asset.filename,
        image_url: asset.locator,
    }))
}

#[utoipa::path(
    post,
    path = "/upload/avatar",
    request_body(content = String, description = "Avatar image file", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar stored and set", body = AvatarResponse),
        (status = 400, description = "Missing file, wrong type, or too large"),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = [])),
    tag = "upload"
)]
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    // Paused users may still update their avatar; the pause rule covers
    // content creation only
    let (user, _principal) = super::load_principal(&state, &claims).await?;

    let (filename, content_type, data) = read_file_field(&mut multipart).await?;

    let asset = state
        .assets
        .put(
            AssetCategory::Avatar,
            &filename,
            content_type.as_deref(),
            data,
        )
        .await?;

    let old_avatar = user.avatar_url.clone();
    state
        .gallery
        .update_avatar(user, asset.locator.clone())
        .await?;

    if let Some(old) = old_avatar {
        if let Err(e) = state.assets.delete(&old).await {
            tracing::warn!("Failed to delete replaced avatar '{}': {}", old, e);
        }
    }

    Ok(Json(AvatarResponse {
        success: true,
        avatar_url: asset.locator,
    }))
}
