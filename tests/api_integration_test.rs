use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use gallery_backend::config::AppConfig;
use gallery_backend::entities::{artworks, folders, prelude::*, users};
use gallery_backend::infrastructure::database;
use gallery_backend::services::gallery::GalleryService;
use gallery_backend::services::storage::{
    AssetCategory, AssetStore, AssetStoreError, StoredAsset,
};
use gallery_backend::utils::auth::create_session_token;
use gallery_backend::utils::validation::{self, UploadPolicy};
use gallery_backend::{AppState, create_app};
use http_body_util::BodyExt;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

/// In-memory asset backend running the same pre-persist checks as the real
/// ones, so rejected uploads provably never reach storage.
struct MockAssetStore {
    policy: UploadPolicy,
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockAssetStore {
    fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            objects: Mutex::new(HashMap::new()),
        }
    }

    fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn contains(&self, locator: &str) -> bool {
        self.objects.lock().unwrap().contains_key(locator)
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    async fn put(
        &self,
        category: AssetCategory,
        original_filename: &str,
        declared_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<StoredAsset, AssetStoreError> {
        validation::validate_image_upload(declared_type, &data, category, &self.policy)
            .map_err(|e| AssetStoreError::Rejected(e.to_string()))?;

        let filename = validation::unique_object_name(original_filename);
        let locator = format!("/mock/{}/{}", category.prefix(), filename);
        self.objects.lock().unwrap().insert(locator.clone(), data);
        Ok(StoredAsset { locator, filename })
    }

    async fn delete(&self, locator: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(locator);
        Ok(())
    }
}

async fn setup_app() -> (Router, AppState, Arc<MockAssetStore>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let config = AppConfig::development();
    let mock = Arc::new(MockAssetStore::new(UploadPolicy::from_config(&config)));
    let assets: Arc<dyn AssetStore> = mock.clone();
    let gallery = Arc::new(GalleryService::new(db.clone(), assets.clone()));

    let state = AppState {
        db,
        assets,
        gallery,
        config,
    };
    (create_app(state.clone()), state, mock)
}

async fn seed_user(
    state: &AppState,
    email: &str,
    name: &str,
    is_admin: bool,
    is_paused: bool,
) -> users::Model {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        avatar_url: Set(None),
        is_admin: Set(is_admin),
        is_paused: Set(is_paused),
        created_at: Set(Utc::now()),
    };
    user.insert(&state.db).await.unwrap()
}

fn token_for(state: &AppState, user: &users::Model) -> String {
    create_session_token(&user.id, &user.email, &state.config.jwt_secret).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

fn multipart_request(
    uri: &str,
    token: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// 8-byte PNG signature followed by filler
fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len.max(8), 0);
    data
}

async fn upload_png(app: &Router, token: &str, filename: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/upload",
            token,
            filename,
            "image/png",
            &png_bytes(256),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (
        json["imageUrl"].as_str().unwrap().to_string(),
        json["filename"].as_str().unwrap().to_string(),
    )
}

async fn create_artwork(
    app: &Router,
    token: &str,
    title: &str,
    folder_id: Option<&str>,
) -> (StatusCode, Value) {
    let (image_url, filename) = upload_png(app, token, "piece.png").await;
    let mut body = json!({
        "title": title,
        "imageUrl": image_url,
        "filename": filename,
    });
    if let Some(folder_id) = folder_id {
        body["folderId"] = json!(folder_id);
    }
    send(app, "POST", "/artworks", Some(token), Some(body)).await
}

#[tokio::test]
async fn test_full_gallery_flow() {
    let (app, state, mock) = setup_app().await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;
    let token = token_for(&state, &alice);

    // Upload an image
    let (image_url, filename) = upload_png(&app, &token, "sunset painting.png").await;
    assert!(mock.contains(&image_url));
    assert!(filename.ends_with("-sunset_painting.png"));

    // Create a folder
    let (status, body) = send(
        &app,
        "POST",
        "/folders",
        Some(&token),
        Some(json!({"name": "Landscapes", "description": "Outdoor work"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let folder_id = body["folder"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["folder"]["_count"]["artworks"], 0);

    // Create an artwork filed under it
    let (status, body) = send(
        &app,
        "POST",
        "/artworks",
        Some(&token),
        Some(json!({
            "title": "Sunset",
            "description": "Oil on canvas",
            "imageUrl": image_url,
            "filename": filename,
            "folderId": folder_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let artwork_id = body["artwork"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["artwork"]["creator"]["name"], "Alice");
    assert_eq!(body["artwork"]["folder"]["name"], "Landscapes");

    // Missing title is rejected up front
    let (status, _) = send(
        &app,
        "POST",
        "/artworks",
        Some(&token),
        Some(json!({"title": "", "imageUrl": "/x.png", "filename": "x.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Public listing carries the creator
    let (status, body) = send(&app, "GET", "/artworks", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artworks"].as_array().unwrap().len(), 1);
    assert_eq!(body["artworks"][0]["creator"]["email"], "alice@example.com");

    // Reading twice yields identical field values
    let uri = format!("/artworks/{}", artwork_id);
    let (_, first) = send(&app, "GET", &uri, None, None).await;
    let (_, second) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(first, second);

    // The folder now counts one artwork
    let (_, body) = send(&app, "GET", &format!("/folders/{}", folder_id), None, None).await;
    assert_eq!(body["folder"]["artworks"].as_array().unwrap().len(), 1);

    // my-artworks is scoped to the caller
    let (status, body) = send(&app, "GET", "/artworks/my-artworks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artworks"].as_array().unwrap().len(), 1);

    // Update: retitle and clear the folder with an explicit null
    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({"title": "Sunset II", "folderId": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artwork"]["title"], "Sunset II");
    assert!(body["artwork"]["folderId"].is_null());
    // Description was not in the patch and is untouched
    assert_eq!(body["artwork"]["description"], "Oil on canvas");

    // Delete removes the row and the backing asset
    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!mock.contains(&image_url));
}

#[tokio::test]
async fn test_upload_validation() {
    let (app, state, mock) = setup_app().await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;
    let token = token_for(&state, &alice);

    // Declared PDF: rejected before any asset write
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/upload",
            &token,
            "doc.pdf",
            "application/pdf",
            b"%PDF-1.5",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mock.len(), 0);

    // Content contradicting the declared image type is also rejected
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/upload",
            &token,
            "fake.png",
            "image/png",
            b"%PDF-1.5 not a png",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mock.len(), 0);

    // 12 MiB artwork exceeds the 10 MiB ceiling
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/upload",
            &token,
            "huge.png",
            "image/png",
            &png_bytes(12 * 1024 * 1024),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mock.len(), 0);

    // 4 MiB avatar fits under the 5 MiB ceiling
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/upload/avatar",
            &token,
            "me.png",
            "image/png",
            &png_bytes(4 * 1024 * 1024),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.len(), 1);

    // 6 MiB avatar does not
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/upload/avatar",
            &token,
            "me.png",
            "image/png",
            &png_bytes(6 * 1024 * 1024),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mock.len(), 1);
}

#[tokio::test]
async fn test_paused_account_lifecycle() {
    let (app, state, _mock) = setup_app().await;
    let admin = seed_user(&state, "root@example.com", "Root", true, false).await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;
    let admin_token = token_for(&state, &admin);
    let alice_token = token_for(&state, &alice);

    // Admin pauses Alice
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/admin/users/{}", alice.id),
        Some(&admin_token),
        Some(json!({"isPaused": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["isPaused"], true);

    // Content creation is blocked across the board: the image upload itself...
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/upload",
            &alice_token,
            "nope.png",
            "image/png",
            &png_bytes(256),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // ...the artwork record...
    let (status, _) = send(
        &app,
        "POST",
        "/artworks",
        Some(&alice_token),
        Some(json!({"title": "Nope", "imageUrl": "/x.png", "filename": "x.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // ...and folders
    let (status, _) = send(
        &app,
        "POST",
        "/folders",
        Some(&alice_token),
        Some(json!({"name": "Nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // But avatars may still be updated while paused
    let response = app
        .clone()
        .oneshot(multipart_request(
            "/upload/avatar",
            &alice_token,
            "me.png",
            "image/png",
            &png_bytes(256),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Unpause: the same requests succeed
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/users/{}", alice.id),
        Some(&admin_token),
        Some(json!({"isPaused": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = create_artwork(&app, &alice_token, "Now it works", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        "/folders",
        Some(&alice_token),
        Some(json!({"name": "Works too"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_self_protection() {
    let (app, state, _mock) = setup_app().await;
    let admin = seed_user(&state, "root@example.com", "Root", true, false).await;
    let token = token_for(&state, &admin);

    // Cannot strip own admin flag
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/users/{}", admin.id),
        Some(&token),
        Some(json!({"isAdmin": false})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let reloaded = Users::find_by_id(&admin.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.is_admin);

    // Cannot delete own account
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/admin/users/{}", admin.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        Users::find_by_id(&admin.id)
            .one(&state.db)
            .await
            .unwrap()
            .is_some()
    );

    // Pausing yourself is not protected
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/admin/users/{}", admin.id),
        Some(&token),
        Some(json!({"isPaused": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["isPaused"], true);
}

#[tokio::test]
async fn test_admin_access_control() {
    let (app, state, _mock) = setup_app().await;
    let admin = seed_user(&state, "root@example.com", "Root", true, false).await;
    let bob = seed_user(&state, "bob@example.com", "Bob", false, false).await;
    let admin_token = token_for(&state, &admin);
    let bob_token = token_for(&state, &bob);

    for (method, uri) in [
        ("GET", "/admin/users".to_string()),
        ("GET", "/admin/artworks".to_string()),
        ("PUT", format!("/admin/users/{}", admin.id)),
        ("DELETE", format!("/admin/users/{}", admin.id)),
    ] {
        let body = (method == "PUT").then(|| json!({"isPaused": true}));
        let (status, _) = send(&app, method, &uri, Some(&bob_token), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
    }

    // Admin check: three callers, one yes
    let (status, body) = send(&app, "GET", "/admin/check", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAdmin"], true);

    let (status, body) = send(&app, "GET", "/admin/check", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["isAdmin"], false);

    let (status, _) = send(&app, "GET", "/admin/check", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin listing works and carries counts
    let (status, body) = send(&app, "GET", "/admin/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    assert!(body["users"][0]["_count"]["artworks"].is_u64());

    // Unknown target is a 404, not a silent success
    let (status, _) = send(
        &app,
        "DELETE",
        "/admin/users/no-such-id",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ownership_rules() {
    let (app, state, _mock) = setup_app().await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;
    let bob = seed_user(&state, "bob@example.com", "Bob", false, false).await;
    let alice_token = token_for(&state, &alice);
    let bob_token = token_for(&state, &bob);

    let (_, body) = send(
        &app,
        "POST",
        "/folders",
        Some(&alice_token),
        Some(json!({"name": "Alice's folder"})),
    )
    .await;
    let alice_folder = body["folder"]["id"].as_str().unwrap().to_string();

    let (_, body) = create_artwork(&app, &alice_token, "Alice's piece", None).await;
    let alice_artwork = body["artwork"]["id"].as_str().unwrap().to_string();

    // Bob cannot mutate or delete Alice's artwork
    let artwork_uri = format!("/artworks/{}", alice_artwork);
    let (status, _) = send(
        &app,
        "PUT",
        &artwork_uri,
        Some(&bob_token),
        Some(json!({"title": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &artwork_uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let untouched = Artworks::find_by_id(&alice_artwork)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.title, "Alice's piece");

    // Nor Alice's folder
    let folder_uri = format!("/folders/{}", alice_folder);
    let (status, _) = send(
        &app,
        "PUT",
        &folder_uri,
        Some(&bob_token),
        Some(json!({"name": "Mine now"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &folder_uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Bob cannot file his artwork into Alice's folder at creation...
    let (status, _) = create_artwork(&app, &bob_token, "Bob's piece", Some(&alice_folder)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // ...nor move an existing one there
    let (_, body) = create_artwork(&app, &bob_token, "Bob's piece", None).await;
    let bob_artwork = body["artwork"]["id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/artworks/{}", bob_artwork),
        Some(&bob_token),
        Some(json!({"folderId": alice_folder})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let unchanged = Artworks::find_by_id(&bob_artwork)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert!(unchanged.folder_id.is_none());
}

#[tokio::test]
async fn test_folder_delete_detaches_artworks() {
    let (app, state, _mock) = setup_app().await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;
    let token = token_for(&state, &alice);

    let (_, body) = send(
        &app,
        "POST",
        "/folders",
        Some(&token),
        Some(json!({"name": "Doomed"})),
    )
    .await;
    let folder_id = body["folder"]["id"].as_str().unwrap().to_string();

    let (_, body) = create_artwork(&app, &token, "First", Some(&folder_id)).await;
    let a1 = body["artwork"]["id"].as_str().unwrap().to_string();
    let (_, body) = create_artwork(&app, &token, "Second", Some(&folder_id)).await;
    let a2 = body["artwork"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/folders/{}", folder_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Both artworks survive, detached
    for id in [&a1, &a2] {
        let artwork = Artworks::find_by_id(id)
            .one(&state.db)
            .await
            .unwrap()
            .unwrap();
        assert!(artwork.folder_id.is_none());
    }

    // The owner's folder count is back to zero
    let (_, body) = send(&app, "GET", &format!("/artists/{}", alice.id), None, None).await;
    assert_eq!(body["artist"]["_count"]["folders"], 0);
    assert_eq!(body["artist"]["_count"]["artworks"], 2);
}

#[tokio::test]
async fn test_user_delete_cascades() {
    let (app, state, mock) = setup_app().await;
    let admin = seed_user(&state, "root@example.com", "Root", true, false).await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;
    let admin_token = token_for(&state, &admin);
    let alice_token = token_for(&state, &alice);

    let (_, body) = send(
        &app,
        "POST",
        "/folders",
        Some(&alice_token),
        Some(json!({"name": "Portfolio"})),
    )
    .await;
    let folder_id = body["folder"]["id"].as_str().unwrap().to_string();
    create_artwork(&app, &alice_token, "One", Some(&folder_id)).await;
    create_artwork(&app, &alice_token, "Two", None).await;
    assert_eq!(mock.len(), 2);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/admin/users/{}", alice.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // No row owned by Alice remains
    assert!(
        Users::find_by_id(&alice.id)
            .one(&state.db)
            .await
            .unwrap()
            .is_none()
    );
    let artworks_left = Artworks::find()
        .filter(artworks::Column::CreatorId.eq(&alice.id))
        .count(&state.db)
        .await
        .unwrap();
    assert_eq!(artworks_left, 0);
    let folders_left = Folders::find()
        .filter(folders::Column::CreatorId.eq(&alice.id))
        .count(&state.db)
        .await
        .unwrap();
    assert_eq!(folders_left, 0);

    // Backing assets went with the rows
    assert_eq!(mock.len(), 0);
}

#[tokio::test]
async fn test_admin_can_delete_any_artwork() {
    let (app, state, mock) = setup_app().await;
    let admin = seed_user(&state, "root@example.com", "Root", true, false).await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;
    let admin_token = token_for(&state, &admin);
    let alice_token = token_for(&state, &alice);

    let (_, body) = create_artwork(&app, &alice_token, "Reported", None).await;
    let artwork_id = body["artwork"]["id"].as_str().unwrap().to_string();
    let image_url = body["artwork"]["imageUrl"].as_str().unwrap().to_string();

    // The admin listing exposes the creator's pause flag
    let (status, body) = send(&app, "GET", "/admin/artworks", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artworks"][0]["creator"]["isPaused"], false);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/admin/artworks/{}", artwork_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        Artworks::find_by_id(&artwork_id)
            .one(&state.db)
            .await
            .unwrap()
            .is_none()
    );
    assert!(!mock.contains(&image_url));

    let (status, _) = send(
        &app,
        "DELETE",
        "/admin/artworks/no-such-id",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_artists_listing() {
    let (app, state, _mock) = setup_app().await;
    let zoe = seed_user(&state, "zoe@example.com", "Zoe", false, false).await;
    let adam = seed_user(&state, "adam@example.com", "Adam", false, false).await;
    seed_user(&state, "lurker@example.com", "Lurker", false, false).await;

    create_artwork(&app, &token_for(&state, &zoe), "Zoe's piece", None).await;
    create_artwork(&app, &token_for(&state, &adam), "Adam's piece", None).await;

    // Only users with artwork, alphabetical by name
    let (status, body) = send(&app, "GET", "/artists", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let artists = body["artists"].as_array().unwrap();
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0]["name"], "Adam");
    assert_eq!(artists[1]["name"], "Zoe");
    assert_eq!(artists[0]["_count"]["artworks"], 1);

    // Profile includes folders and counts
    let (status, body) = send(&app, "GET", &format!("/artists/{}", zoe.id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist"]["name"], "Zoe");
    assert_eq!(body["artist"]["_count"]["artworks"], 1);
    assert!(body["artist"]["folders"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, "GET", "/artists/no-such-id", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_and_invalid_sessions() {
    let (app, state, _mock) = setup_app().await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;

    // Public reads work without a session
    let (status, _) = send(&app, "GET", "/artworks", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/artists", None, None).await;
    assert_eq!(status, StatusCode::OK);

    // Authenticated surface rejects missing and malformed credentials alike
    let (status, _) = send(&app, "GET", "/user/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/user/me", Some("garbage-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        "POST",
        "/artworks",
        None,
        Some(json!({"title": "X", "imageUrl": "/x.png", "filename": "x.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A token signed with a different secret is just as anonymous
    let forged = create_session_token(&alice.id, &alice.email, "wrong-secret").unwrap();
    let (status, _) = send(&app, "GET", "/user/me", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A valid session works, and the token cookie is accepted too
    let token = token_for(&state, &alice);
    let (status, body) = send(&app, "GET", "/user/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "alice@example.com");

    let request = Request::builder()
        .method("GET")
        .uri("/user/me")
        .header("Cookie", format!("token={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_folder_listing_filters() {
    let (app, state, _mock) = setup_app().await;
    let alice = seed_user(&state, "alice@example.com", "Alice", false, false).await;
    let bob = seed_user(&state, "bob@example.com", "Bob", false, false).await;
    let alice_token = token_for(&state, &alice);
    let bob_token = token_for(&state, &bob);

    send(
        &app,
        "POST",
        "/folders",
        Some(&alice_token),
        Some(json!({"name": "Alice A"})),
    )
    .await;
    send(
        &app,
        "POST",
        "/folders",
        Some(&bob_token),
        Some(json!({"name": "Bob B"})),
    )
    .await;

    // Unfiltered: everything, with creators
    let (status, body) = send(&app, "GET", "/folders", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["folders"].as_array().unwrap().len(), 2);
    assert!(body["folders"][0]["creator"]["name"].is_string());

    // By creator id: public
    let (status, body) = send(
        &app,
        "GET",
        &format!("/folders?creatorId={}", alice.id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["folders"].as_array().unwrap().len(), 1);
    assert_eq!(body["folders"][0]["name"], "Alice A");

    // creatorId=me requires a session
    let (status, _) = send(&app, "GET", "/folders?creatorId=me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = send(&app, "GET", "/folders?creatorId=me", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["folders"].as_array().unwrap().len(), 1);
    assert_eq!(body["folders"][0]["name"], "Bob B");
}
