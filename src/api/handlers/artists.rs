use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use super::types::*;
use crate::AppState;
use crate::api::error::AppError;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    #[serde(rename = "_count")]
    pub count: CountInfo,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub folders: Vec<FolderResponse>,
    #[serde(rename = "_count")]
    pub count: CountInfo,
}

#[derive(Serialize, ToSchema)]
pub struct ArtistsEnvelope {
    pub artists: Vec<ArtistResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct ArtistEnvelope {
    pub artist: ArtistProfileResponse,
}

#[utoipa::path(
    get,
    path = "/artists",
    responses(
        (status = 200, description = "Users with at least one artwork, alphabetical", body = ArtistsEnvelope)
    ),
    tag = "artists"
)]
pub async fn list_artists(
    State(state): State<AppState>,
) -> Result<Json<ArtistsEnvelope>, AppError> {
    let artists = state.gallery.list_artists().await?;
    Ok(Json(ArtistsEnvelope {
        artists: artists
            .into_iter()
            .map(|a| ArtistResponse {
                id: a.user.id,
                name: a.user.name,
                email: a.user.email,
                avatar_url: a.user.avatar_url,
                count: CountInfo {
                    artworks: a.artwork_count,
                    folders: a.folder_count,
                },
            })
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/artists/{id}",
    params(("id" = String, Path, description = "Artist (user) ID")),
    responses(
        (status = 200, description = "Artist profile with folders and counts", body = ArtistEnvelope),
        (status = 404, description = "Artist not found")
    ),
    tag = "artists"
)]
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtistEnvelope>, AppError> {
    let profile = state
        .gallery
        .artist_profile(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

    Ok(Json(ArtistEnvelope {
        artist: ArtistProfileResponse {
            id: profile.user.id,
            name: profile.user.name,
            email: profile.user.email,
            avatar_url: profile.user.avatar_url,
            created_at: profile.user.created_at,
            folders: profile
                .folders
                .into_iter()
                .map(FolderResponse::from_meta)
                .collect(),
            count: CountInfo {
                artworks: profile.artwork_count,
                folders: profile.folder_count,
            },
        },
    }))
}
