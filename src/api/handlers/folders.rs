use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::types::*;
use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::request_identity;
use crate::services::authz::{self, Action};
use crate::services::gallery::{FolderPatch, NewFolder};
use crate::utils::auth::{Claims, Identity};

#[derive(Serialize, ToSchema)]
pub struct FoldersEnvelope {
    pub folders: Vec<FolderResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct FolderEnvelope {
    pub folder: FolderResponse,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderContentsResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub creator_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorInfo>,
    pub artworks: Vec<ArtworkResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct FolderContentsEnvelope {
    pub folder: FolderContentsResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFoldersQuery {
    pub creator_id: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 100, message = "Folder name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[utoipa::path(
    get,
    path = "/folders",
    params(
        ("creatorId" = Option<String>, Query, description = "Restrict to one creator; \"me\" for the caller")
    ),
    responses(
        (status = 200, description = "Folders with creator and artwork counts", body = FoldersEnvelope),
        (status = 401, description = "creatorId=me without a session")
    ),
    tag = "folders"
)]
pub async fn list_folders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListFoldersQuery>,
) -> Result<Json<FoldersEnvelope>, AppError> {
    let creator_id = match query.creator_id.as_deref() {
        Some("me") => {
            // The only authenticated variant of this public listing
            match request_identity(&headers, None, &state.config.jwt_secret) {
                Identity::Known(claims) => Some(claims.sub),
                Identity::Anonymous => {
                    return Err(AppError::Unauthorized("Unauthorized".to_string()));
                }
            }
        }
        Some(id) => Some(id.to_string()),
        None => None,
    };

    let folders = state.gallery.list_folders(creator_id.as_deref()).await?;
    Ok(Json(FoldersEnvelope {
        folders: folders.into_iter().map(FolderResponse::from_meta).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderEnvelope),
        (status = 400, description = "Missing folder name"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account paused")
    ),
    security(("session" = [])),
    tag = "folders"
)]
pub async fn create_folder(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderEnvelope>), AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(&principal, &Action::CreateContent)?;

    let folder = state
        .gallery
        .create_folder(NewFolder {
            name: req.name,
            description: req.description,
            creator_id: claims.sub.clone(),
        })
        .await?;

    let meta = state
        .gallery
        .folder_with_meta(&folder.id)
        .await?
        .ok_or_else(|| AppError::Internal("Folder vanished after insert".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(FolderEnvelope {
            folder: FolderResponse::from_meta(meta),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/folders/{id}",
    params(("id" = String, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder with its artworks", body = FolderContentsEnvelope),
        (status = 404, description = "Folder not found")
    ),
    tag = "folders"
)]
pub async fn get_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FolderContentsEnvelope>, AppError> {
    let contents = state
        .gallery
        .folder_contents(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;

    Ok(Json(FolderContentsEnvelope {
        folder: FolderContentsResponse {
            id: contents.folder.id,
            name: contents.folder.name,
            description: contents.folder.description,
            creator_id: contents.folder.creator_id,
            created_at: contents.folder.created_at,
            creator: contents.creator.as_ref().map(CreatorInfo::from_user),
            artworks: contents
                .artworks
                .into_iter()
                .map(ArtworkResponse::from_model)
                .collect(),
        },
    }))
}

#[utoipa::path(
    put,
    path = "/folders/{id}",
    params(("id" = String, Path, description = "Folder ID")),
    request_body = UpdateFolderRequest,
    responses(
        (status = 200, description = "Folder updated", body = FolderEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Folder not found")
    ),
    security(("session" = [])),
    tag = "folders"
)]
pub async fn update_folder(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFolderRequest>,
) -> Result<Json<FolderEnvelope>, AppError> {
    let folder = state
        .gallery
        .find_folder(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;

    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(
        &principal,
        &Action::MutateFolder {
            owner_id: &folder.creator_id,
        },
    )?;

    let updated = state
        .gallery
        .update_folder(
            folder,
            FolderPatch {
                name: req.name.filter(|n| !n.is_empty()),
                description: req.description,
            },
        )
        .await?;

    let meta = state
        .gallery
        .folder_with_meta(&updated.id)
        .await?
        .ok_or_else(|| AppError::Internal("Folder vanished after update".to_string()))?;

    Ok(Json(FolderEnvelope {
        folder: FolderResponse::from_meta(meta),
    }))
}

#[utoipa::path(
    delete,
    path = "/folders/{id}",
    params(("id" = String, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder deleted; its artworks are detached, not deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Folder not found")
    ),
    security(("session" = [])),
    tag = "folders"
)]
pub async fn delete_folder(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let folder = state
        .gallery
        .find_folder(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;

    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(
        &principal,
        &Action::MutateFolder {
            owner_id: &folder.creator_id,
        },
    )?;

    state.gallery.delete_folder_detach(folder).await?;

    Ok(Json(MessageResponse::new("Folder deleted successfully")))
}
