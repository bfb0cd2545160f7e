use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::types::*;
use crate::AppState;
use crate::api::error::AppError;
use crate::services::authz::{self, Action, Principal};
use crate::services::gallery::{ArtworkPatch, NewArtwork};
use crate::utils::auth::Claims;

#[derive(Serialize, ToSchema)]
pub struct ArtworksEnvelope {
    pub artworks: Vec<ArtworkResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct ArtworkEnvelope {
    pub artwork: ArtworkResponse,
}

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtworkRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "imageUrl is required"))]
    pub image_url: String,
    #[validate(length(min = 1, message = "filename is required"))]
    pub filename: String,
    pub folder_id: Option<String>,
}

/// `None` = untouched, `Some(None)` = explicit JSON null, clearing the field.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtworkRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub folder_id: Option<Option<String>>,
}

/// Filing an artwork requires the folder to exist and to belong to the same
/// owner; anything else reads as "folder not found or access denied".
async fn ensure_folder_assignable(
    state: &AppState,
    principal: &Principal,
    folder_id: &str,
) -> Result<(), AppError> {
    let folder = state
        .gallery
        .find_folder(folder_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Folder not found or access denied".to_string()))?;

    authz::ensure(
        principal,
        &Action::FileIntoFolder {
            artwork_owner_id: &principal.user_id,
            folder_owner_id: &folder.creator_id,
        },
    )
}

#[utoipa::path(
    get,
    path = "/artworks",
    responses(
        (status = 200, description = "All artworks, newest first", body = ArtworksEnvelope)
    ),
    tag = "artworks"
)]
pub async fn list_artworks(
    State(state): State<AppState>,
) -> Result<Json<ArtworksEnvelope>, AppError> {
    let artworks = state.gallery.list_artworks(None).await?;
    Ok(Json(ArtworksEnvelope {
        artworks: artworks
            .into_iter()
            .map(ArtworkResponse::from_relations)
            .collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/artworks",
    request_body = CreateArtworkRequest,
    responses(
        (status = 201, description = "Artwork created", body = ArtworkEnvelope),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account paused or folder not owned")
    ),
    security(("session" = [])),
    tag = "artworks"
)]
pub async fn create_artwork(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateArtworkRequest>,
) -> Result<(StatusCode, Json<ArtworkEnvelope>), AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(&principal, &Action::CreateContent)?;

    if let Some(ref folder_id) = req.folder_id {
        ensure_folder_assignable(&state, &principal, folder_id).await?;
    }

    let artwork = state
        .gallery
        .create_artwork(NewArtwork {
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            filename: req.filename,
            creator_id: claims.sub.clone(),
            folder_id: req.folder_id,
        })
        .await?;

    let related = state
        .gallery
        .artwork_with_relations(&artwork.id)
        .await?
        .ok_or_else(|| AppError::Internal("Artwork vanished after insert".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ArtworkEnvelope {
            artwork: ArtworkResponse::from_relations(related),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/artworks/{id}",
    params(("id" = String, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "Artwork with creator and folder", body = ArtworkEnvelope),
        (status = 404, description = "Artwork not found")
    ),
    tag = "artworks"
)]
pub async fn get_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtworkEnvelope>, AppError> {
    let related = state
        .gallery
        .artwork_with_relations(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))?;

    Ok(Json(ArtworkEnvelope {
        artwork: ArtworkResponse::from_relations(related),
    }))
}

#[utoipa::path(
    put,
    path = "/artworks/{id}",
    params(("id" = String, Path, description = "Artwork ID")),
    request_body = UpdateArtworkRequest,
    responses(
        (status = 200, description = "Artwork updated", body = ArtworkEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner, or folder not owned"),
        (status = 404, description = "Artwork not found")
    ),
    security(("session" = [])),
    tag = "artworks"
)]
pub async fn update_artwork(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateArtworkRequest>,
) -> Result<Json<ArtworkEnvelope>, AppError> {
    let artwork = state
        .gallery
        .find_artwork(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))?;

    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(
        &principal,
        &Action::MutateArtwork {
            owner_id: &artwork.creator_id,
        },
    )?;

    if let Some(Some(ref folder_id)) = req.folder_id {
        ensure_folder_assignable(&state, &principal, folder_id).await?;
    }

    let updated = state
        .gallery
        .update_artwork(
            artwork,
            ArtworkPatch {
                title: req.title.filter(|t| !t.is_empty()),
                description: req.description,
                folder_id: req.folder_id,
            },
        )
        .await?;

    let related = state
        .gallery
        .artwork_with_relations(&updated.id)
        .await?
        .ok_or_else(|| AppError::Internal("Artwork vanished after update".to_string()))?;

    Ok(Json(ArtworkEnvelope {
        artwork: ArtworkResponse::from_relations(related),
    }))
}

#[utoipa::path(
    delete,
    path = "/artworks/{id}",
    params(("id" = String, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "Artwork deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Artwork not found")
    ),
    security(("session" = [])),
    tag = "artworks"
)]
pub async fn delete_artwork(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let artwork = state
        .gallery
        .find_artwork(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))?;

    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(
        &principal,
        &Action::MutateArtwork {
            owner_id: &artwork.creator_id,
        },
    )?;

    state.gallery.delete_artwork(artwork).await?;

    Ok(Json(MessageResponse::new("Artwork deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/artworks/my-artworks",
    responses(
        (status = 200, description = "The caller's artworks, newest first", body = ArtworksEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("session" = [])),
    tag = "artworks"
)]
pub async fn my_artworks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ArtworksEnvelope>, AppError> {
    let artworks = state.gallery.list_artworks(Some(&claims.sub)).await?;
    Ok(Json(ArtworksEnvelope {
        artworks: artworks
            .into_iter()
            .map(ArtworkResponse::from_relations)
            .collect(),
    }))
}
