use axum::{Extension, Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::AppError;
use crate::utils::auth::Claims;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub is_paused: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MeEnvelope {
    pub user: MeResponse,
}

#[utoipa::path(
    get,
    path = "/user/me",
    responses(
        (status = 200, description = "The authenticated user", body = MeEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("session" = [])),
    tag = "users"
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeEnvelope>, AppError> {
    let user = state
        .gallery
        .find_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(MeEnvelope {
        user: MeResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            is_admin: user.is_admin,
            is_paused: user.is_paused,
        },
    }))
}
