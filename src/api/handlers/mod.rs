pub mod admin;
pub mod artists;
pub mod artworks;
pub mod folders;
pub mod health;
pub mod types;
pub mod upload;
pub mod users;

use crate::api::error::AppError;
use crate::entities::users::Model as UserModel;
use crate::services::authz::Principal;
use crate::utils::auth::Claims;
use crate::AppState;

/// Loads the acting user fresh and derives the principal the authorization
/// gate runs against. Never cached; pause/admin flags may have changed since
/// the token was minted.
pub(crate) async fn load_principal(
    state: &AppState,
    claims: &Claims,
) -> Result<(UserModel, Principal), AppError> {
    let user = state
        .gallery
        .find_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
    let principal = Principal::from_user(&user);
    Ok((user, principal))
}
