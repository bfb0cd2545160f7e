use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::*;
use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::auth::request_identity;
use crate::services::authz::{self, Action};
use crate::services::gallery::UserFlagsPatch;
use crate::utils::auth::{Claims, Identity};

#[derive(Serialize, ToSchema)]
pub struct UsersEnvelope {
    pub users: Vec<UserResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Serialize, ToSchema)]
pub struct AdminArtworksEnvelope {
    pub artworks: Vec<ArtworkResponse>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheckResponse {
    pub is_admin: bool,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub is_paused: Option<bool>,
    pub is_admin: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminArtworksQuery {
    pub user_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All users with content counts", body = UsersEnvelope),
        (status = 403, description = "Admin access required")
    ),
    security(("session" = [])),
    tag = "admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UsersEnvelope>, AppError> {
    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(&principal, &Action::ViewAdminListings)?;

    let users = state.gallery.list_users_with_counts().await?;
    Ok(Json(UsersEnvelope {
        users: users.into_iter().map(UserResponse::from_counts).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User flags updated", body = UserEnvelope),
        (status = 400, description = "Self-demotion"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("session" = [])),
    tag = "admin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, AppError> {
    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(
        &principal,
        &Action::UpdateUser {
            target_id: &id,
            revokes_admin: req.is_admin == Some(false),
        },
    )?;

    let target = state
        .gallery
        .find_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let updated = state
        .gallery
        .update_user_flags(
            target,
            UserFlagsPatch {
                is_paused: req.is_paused,
                is_admin: req.is_admin,
            },
        )
        .await?;

    let with_counts = state.gallery.user_with_counts(updated).await?;
    Ok(Json(UserEnvelope {
        user: UserResponse::from_counts(with_counts),
    }))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User and all owned content deleted", body = MessageResponse),
        (status = 400, description = "Self-deletion"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("session" = [])),
    tag = "admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(&principal, &Action::DeleteUser { target_id: &id })?;

    let target = state
        .gallery
        .find_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    state.gallery.delete_user_cascade(target).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/admin/artworks",
    params(
        ("userId" = Option<String>, Query, description = "Restrict to one creator")
    ),
    responses(
        (status = 200, description = "All artworks with creator and folder", body = AdminArtworksEnvelope),
        (status = 403, description = "Admin access required")
    ),
    security(("session" = [])),
    tag = "admin"
)]
pub async fn list_artworks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AdminArtworksQuery>,
) -> Result<Json<AdminArtworksEnvelope>, AppError> {
    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(&principal, &Action::ViewAdminListings)?;

    let artworks = state
        .gallery
        .list_artworks(query.user_id.as_deref())
        .await?;
    Ok(Json(AdminArtworksEnvelope {
        artworks: artworks
            .into_iter()
            .map(ArtworkResponse::from_relations_admin)
            .collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/admin/artworks/{id}",
    params(("id" = String, Path, description = "Artwork ID")),
    responses(
        (status = 200, description = "Artwork deleted", body = MessageResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Artwork not found")
    ),
    security(("session" = [])),
    tag = "admin"
)]
pub async fn delete_artwork(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let (_user, principal) = super::load_principal(&state, &claims).await?;
    authz::ensure(&principal, &Action::DeleteAnyArtwork)?;

    let artwork = state
        .gallery
        .find_artwork(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))?;

    state.gallery.delete_artwork(artwork).await?;

    Ok(Json(MessageResponse::new("Artwork deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/admin/check",
    responses(
        (status = 200, description = "Caller is an administrator", body = AdminCheckResponse),
        (status = 403, description = "Caller is not an administrator", body = AdminCheckResponse)
    ),
    tag = "admin"
)]
pub async fn check_admin(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    // No middleware here: anonymous callers get the same 403 as non-admins
    let is_admin = match request_identity(&headers, None, &state.config.jwt_secret) {
        Identity::Known(claims) => matches!(
            state.gallery.find_user(&claims.sub).await,
            Ok(Some(user)) if user.is_admin
        ),
        Identity::Anonymous => false,
    };

    let status = if is_admin {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };
    (status, Json(AdminCheckResponse { is_admin }))
}
