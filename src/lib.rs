pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::gallery::GalleryService;
use crate::services::storage::AssetStore;
use axum::{
    Router,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::artists::list_artists,
        api::handlers::artists::get_artist,
        api::handlers::artworks::list_artworks,
        api::handlers::artworks::create_artwork,
        api::handlers::artworks::get_artwork,
        api::handlers::artworks::update_artwork,
        api::handlers::artworks::delete_artwork,
        api::handlers::artworks::my_artworks,
        api::handlers::folders::list_folders,
        api::handlers::folders::create_folder,
        api::handlers::folders::get_folder,
        api::handlers::folders::update_folder,
        api::handlers::folders::delete_folder,
        api::handlers::upload::upload_image,
        api::handlers::upload::upload_avatar,
        api::handlers::users::me,
        api::handlers::admin::list_users,
        api::handlers::admin::update_user,
        api::handlers::admin::delete_user,
        api::handlers::admin::list_artworks,
        api::handlers::admin::delete_artwork,
        api::handlers::admin::check_admin,
    ),
    components(
        schemas(
            api::handlers::types::CreatorInfo,
            api::handlers::types::FolderBrief,
            api::handlers::types::CountInfo,
            api::handlers::types::ArtworkCountInfo,
            api::handlers::types::ArtworkResponse,
            api::handlers::types::FolderResponse,
            api::handlers::types::UserResponse,
            api::handlers::types::MessageResponse,
            api::handlers::health::HealthResponse,
            api::handlers::artists::ArtistResponse,
            api::handlers::artists::ArtistProfileResponse,
            api::handlers::artists::ArtistsEnvelope,
            api::handlers::artists::ArtistEnvelope,
            api::handlers::artworks::ArtworksEnvelope,
            api::handlers::artworks::ArtworkEnvelope,
            api::handlers::artworks::CreateArtworkRequest,
            api::handlers::artworks::UpdateArtworkRequest,
            api::handlers::folders::FoldersEnvelope,
            api::handlers::folders::FolderEnvelope,
            api::handlers::folders::FolderContentsResponse,
            api::handlers::folders::FolderContentsEnvelope,
            api::handlers::folders::CreateFolderRequest,
            api::handlers::folders::UpdateFolderRequest,
            api::handlers::upload::UploadResponse,
            api::handlers::upload::AvatarResponse,
            api::handlers::users::MeResponse,
            api::handlers::users::MeEnvelope,
            api::handlers::admin::UsersEnvelope,
            api::handlers::admin::UserEnvelope,
            api::handlers::admin::AdminArtworksEnvelope,
            api::handlers::admin::AdminCheckResponse,
            api::handlers::admin::UpdateUserRequest,
        )
    ),
    tags(
        (name = "artworks", description = "Artwork browsing and management"),
        (name = "folders", description = "Folder management"),
        (name = "artists", description = "Public artist directory"),
        (name = "upload", description = "Image and avatar uploads"),
        (name = "users", description = "Current user"),
        (name = "admin", description = "Moderation endpoints"),
        (name = "system", description = "Health and docs")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub assets: Arc<dyn AssetStore>,
    pub gallery: Arc<GalleryService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/artists", get(api::handlers::artists::list_artists))
        .route("/artists/:id", get(api::handlers::artists::get_artist))
        .route(
            "/artworks",
            get(api::handlers::artworks::list_artworks).merge(
                post(api::handlers::artworks::create_artwork).layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
            ),
        )
        .route(
            "/artworks/my-artworks",
            get(api::handlers::artworks::my_artworks).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/artworks/:id",
            get(api::handlers::artworks::get_artwork).merge(
                put(api::handlers::artworks::update_artwork)
                    .delete(api::handlers::artworks::delete_artwork)
                    .layer(from_fn_with_state(
                        state.clone(),
                        api::middleware::auth::auth_middleware,
                    )),
            ),
        )
        .route(
            "/folders",
            get(api::handlers::folders::list_folders).merge(
                post(api::handlers::folders::create_folder).layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
            ),
        )
        .route(
            "/folders/:id",
            get(api::handlers::folders::get_folder).merge(
                put(api::handlers::folders::update_folder)
                    .delete(api::handlers::folders::delete_folder)
                    .layer(from_fn_with_state(
                        state.clone(),
                        api::middleware::auth::auth_middleware,
                    )),
            ),
        )
        .route(
            "/upload",
            post(api::handlers::upload::upload_image).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/upload/avatar",
            post(api::handlers::upload::upload_avatar).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/user/me",
            get(api::handlers::users::me).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/admin/users",
            get(api::handlers::admin::list_users).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/admin/users/:id",
            put(api::handlers::admin::update_user)
                .delete(api::handlers::admin::delete_user)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/admin/artworks",
            get(api::handlers::admin::list_artworks).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/admin/artworks/:id",
            delete(api::handlers::admin::delete_artwork).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route("/admin/check", get(api::handlers::admin::check_admin))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            // Roomy enough that oversize uploads reach the size check and get
            // a proper 400 instead of a truncated stream
            state.config.max_upload_size() + 10 * 1024 * 1024,
        ))
        .with_state(state)
}
