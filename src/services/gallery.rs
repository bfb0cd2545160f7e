//! Typed persistence operations for the three entities. Derived counts are
//! recomputed from live rows on every read; multi-row invariants (user
//! cascade, folder detach) run inside a single transaction. Asset removal is
//! never transactional with the database: rows go first, files follow
//! best-effort.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::api::error::AppError;
use crate::entities::{artworks, folders, prelude::*, users};
use crate::services::storage::AssetStore;

pub struct GalleryService {
    db: DatabaseConnection,
    assets: Arc<dyn AssetStore>,
}

pub struct UserWithCounts {
    pub user: users::Model,
    pub artwork_count: u64,
    pub folder_count: u64,
}

pub struct FolderWithMeta {
    pub folder: folders::Model,
    pub creator: Option<users::Model>,
    pub artwork_count: u64,
}

pub struct ArtworkWithRelations {
    pub artwork: artworks::Model,
    pub creator: Option<users::Model>,
    pub folder: Option<folders::Model>,
}

pub struct ArtistProfile {
    pub user: users::Model,
    pub folders: Vec<FolderWithMeta>,
    pub artwork_count: u64,
    pub folder_count: u64,
}

pub struct FolderContents {
    pub folder: folders::Model,
    pub creator: Option<users::Model>,
    pub artworks: Vec<artworks::Model>,
}

pub struct NewArtwork {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub filename: String,
    pub creator_id: String,
    pub folder_id: Option<String>,
}

/// Partial patch: `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Default)]
pub struct ArtworkPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub folder_id: Option<Option<String>>,
}

pub struct NewFolder {
    pub name: String,
    pub description: Option<String>,
    pub creator_id: String,
}

#[derive(Default)]
pub struct FolderPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

#[derive(Default)]
pub struct UserFlagsPatch {
    pub is_paused: Option<bool>,
    pub is_admin: Option<bool>,
}

impl GalleryService {
    pub fn new(db: DatabaseConnection, assets: Arc<dyn AssetStore>) -> Self {
        Self { db, assets }
    }

    async fn delete_asset_best_effort(&self, locator: &str) {
        if let Err(e) = self.assets.delete(locator).await {
            tracing::warn!("Failed to delete asset '{}', leaking it: {}", locator, e);
        }
    }

    // ---- Users ----

    pub async fn find_user(&self, id: &str) -> Result<Option<users::Model>, AppError> {
        Ok(Users::find_by_id(id).one(&self.db).await?)
    }

    pub async fn user_with_counts(&self, user: users::Model) -> Result<UserWithCounts, AppError> {
        let artwork_count = Artworks::find()
            .filter(artworks::Column::CreatorId.eq(&user.id))
            .count(&self.db)
            .await?;
        let folder_count = Folders::find()
            .filter(folders::Column::CreatorId.eq(&user.id))
            .count(&self.db)
            .await?;
        Ok(UserWithCounts {
            user,
            artwork_count,
            folder_count,
        })
    }

    /// Every user, newest first, with live counts (admin listing).
    pub async fn list_users_with_counts(&self) -> Result<Vec<UserWithCounts>, AppError> {
        let users = Users::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut out = Vec::with_capacity(users.len());
        for user in users {
            out.push(self.user_with_counts(user).await?);
        }
        Ok(out)
    }

    pub async fn update_user_flags(
        &self,
        user: users::Model,
        patch: UserFlagsPatch,
    ) -> Result<users::Model, AppError> {
        let mut active: users::ActiveModel = user.into();
        if let Some(paused) = patch.is_paused {
            active.is_paused = Set(paused);
        }
        if let Some(admin) = patch.is_admin {
            active.is_admin = Set(admin);
        }
        Ok(active.update(&self.db).await?)
    }

    /// Removes the user and every row owned by them in one transaction, then
    /// deletes the backing assets best-effort.
    pub async fn delete_user_cascade(&self, user: users::Model) -> Result<(), AppError> {
        let owned = Artworks::find()
            .filter(artworks::Column::CreatorId.eq(&user.id))
            .all(&self.db)
            .await?;

        let mut locators: Vec<String> = owned.into_iter().map(|a| a.image_url).collect();
        if let Some(avatar) = user.avatar_url.clone() {
            locators.push(avatar);
        }

        let txn = self.db.begin().await.map_err(AppError::Database)?;
        Artworks::delete_many()
            .filter(artworks::Column::CreatorId.eq(&user.id))
            .exec(&txn)
            .await?;
        Folders::delete_many()
            .filter(folders::Column::CreatorId.eq(&user.id))
            .exec(&txn)
            .await?;
        Users::delete_by_id(&user.id).exec(&txn).await?;
        txn.commit().await.map_err(AppError::Database)?;

        for locator in &locators {
            self.delete_asset_best_effort(locator).await;
        }

        Ok(())
    }

    pub async fn update_avatar(
        &self,
        user: users::Model,
        avatar_url: String,
    ) -> Result<users::Model, AppError> {
        let mut active: users::ActiveModel = user.into();
        active.avatar_url = Set(Some(avatar_url));
        Ok(active.update(&self.db).await?)
    }

    // ---- Artists (public views) ----

    /// Users with at least one artwork, alphabetical by name.
    pub async fn list_artists(&self) -> Result<Vec<UserWithCounts>, AppError> {
        let users = Users::find()
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await?;

        let mut out = Vec::new();
        for user in users {
            let with_counts = self.user_with_counts(user).await?;
            if with_counts.artwork_count > 0 {
                out.push(with_counts);
            }
        }
        Ok(out)
    }

    pub async fn artist_profile(&self, id: &str) -> Result<Option<ArtistProfile>, AppError> {
        let Some(user) = self.find_user(id).await? else {
            return Ok(None);
        };

        let folders = Folders::find()
            .filter(folders::Column::CreatorId.eq(id))
            .order_by_desc(folders::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut folders_with_meta = Vec::with_capacity(folders.len());
        for folder in folders {
            let artwork_count = Artworks::find()
                .filter(artworks::Column::FolderId.eq(&folder.id))
                .count(&self.db)
                .await?;
            folders_with_meta.push(FolderWithMeta {
                folder,
                creator: None,
                artwork_count,
            });
        }

        let with_counts = self.user_with_counts(user).await?;
        Ok(Some(ArtistProfile {
            user: with_counts.user,
            folders: folders_with_meta,
            artwork_count: with_counts.artwork_count,
            folder_count: with_counts.folder_count,
        }))
    }

    // ---- Folders ----

    pub async fn find_folder(&self, id: &str) -> Result<Option<folders::Model>, AppError> {
        Ok(Folders::find_by_id(id).one(&self.db).await?)
    }

    /// Folders newest first, optionally restricted to one creator, each with
    /// its creator and live artwork count.
    pub async fn list_folders(
        &self,
        creator_id: Option<&str>,
    ) -> Result<Vec<FolderWithMeta>, AppError> {
        let mut query = Folders::find().order_by_desc(folders::Column::CreatedAt);
        if let Some(creator) = creator_id {
            query = query.filter(folders::Column::CreatorId.eq(creator));
        }
        let rows = query.find_also_related(Users).all(&self.db).await?;

        let mut out = Vec::with_capacity(rows.len());
        for (folder, creator) in rows {
            let artwork_count = Artworks::find()
                .filter(artworks::Column::FolderId.eq(&folder.id))
                .count(&self.db)
                .await?;
            out.push(FolderWithMeta {
                folder,
                creator,
                artwork_count,
            });
        }
        Ok(out)
    }

    pub async fn folder_with_meta(&self, id: &str) -> Result<Option<FolderWithMeta>, AppError> {
        let Some(folder) = self.find_folder(id).await? else {
            return Ok(None);
        };
        let creator = Users::find_by_id(&folder.creator_id).one(&self.db).await?;
        let artwork_count = Artworks::find()
            .filter(artworks::Column::FolderId.eq(&folder.id))
            .count(&self.db)
            .await?;
        Ok(Some(FolderWithMeta {
            folder,
            creator,
            artwork_count,
        }))
    }

    pub async fn folder_contents(&self, id: &str) -> Result<Option<FolderContents>, AppError> {
        let Some(folder) = self.find_folder(id).await? else {
            return Ok(None);
        };
        let creator = Users::find_by_id(&folder.creator_id).one(&self.db).await?;
        let artworks = Artworks::find()
            .filter(artworks::Column::FolderId.eq(&folder.id))
            .order_by_desc(artworks::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(Some(FolderContents {
            folder,
            creator,
            artworks,
        }))
    }

    pub async fn create_folder(&self, input: NewFolder) -> Result<folders::Model, AppError> {
        let folder = folders::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(input.name),
            description: Set(input.description),
            creator_id: Set(input.creator_id),
            created_at: Set(Utc::now()),
        };
        Ok(folder.insert(&self.db).await?)
    }

    pub async fn update_folder(
        &self,
        folder: folders::Model,
        patch: FolderPatch,
    ) -> Result<folders::Model, AppError> {
        let mut active: folders::ActiveModel = folder.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        Ok(active.update(&self.db).await?)
    }

    /// Deletes the folder and detaches its artworks in one transaction; the
    /// artworks themselves survive.
    pub async fn delete_folder_detach(&self, folder: folders::Model) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(AppError::Database)?;
        Artworks::update_many()
            .col_expr(artworks::Column::FolderId, Expr::value(Option::<String>::None))
            .filter(artworks::Column::FolderId.eq(&folder.id))
            .exec(&txn)
            .await?;
        Folders::delete_by_id(&folder.id).exec(&txn).await?;
        txn.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    // ---- Artworks ----

    pub async fn find_artwork(&self, id: &str) -> Result<Option<artworks::Model>, AppError> {
        Ok(Artworks::find_by_id(id).one(&self.db).await?)
    }

    pub async fn artwork_with_relations(
        &self,
        id: &str,
    ) -> Result<Option<ArtworkWithRelations>, AppError> {
        let Some(artwork) = self.find_artwork(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.load_relations(artwork).await?))
    }

    async fn load_relations(
        &self,
        artwork: artworks::Model,
    ) -> Result<ArtworkWithRelations, AppError> {
        let creator = Users::find_by_id(&artwork.creator_id).one(&self.db).await?;
        let folder = match &artwork.folder_id {
            Some(folder_id) => Folders::find_by_id(folder_id).one(&self.db).await?,
            None => None,
        };
        Ok(ArtworkWithRelations {
            artwork,
            creator,
            folder,
        })
    }

    /// All artworks newest first, optionally restricted to one creator, with
    /// creator and folder loaded.
    pub async fn list_artworks(
        &self,
        creator_id: Option<&str>,
    ) -> Result<Vec<ArtworkWithRelations>, AppError> {
        let mut query = Artworks::find().order_by_desc(artworks::Column::CreatedAt);
        if let Some(creator) = creator_id {
            query = query.filter(artworks::Column::CreatorId.eq(creator));
        }
        let rows = query.find_also_related(Users).all(&self.db).await?;

        // One folder query for the whole page instead of one per row
        let folder_ids: Vec<String> = rows
            .iter()
            .filter_map(|(a, _)| a.folder_id.clone())
            .collect();
        let mut folder_map: HashMap<String, folders::Model> = HashMap::new();
        if !folder_ids.is_empty() {
            for folder in Folders::find()
                .filter(folders::Column::Id.is_in(folder_ids))
                .all(&self.db)
                .await?
            {
                folder_map.insert(folder.id.clone(), folder);
            }
        }

        Ok(rows
            .into_iter()
            .map(|(artwork, creator)| {
                let folder = artwork
                    .folder_id
                    .as_ref()
                    .and_then(|id| folder_map.get(id).cloned());
                ArtworkWithRelations {
                    artwork,
                    creator,
                    folder,
                }
            })
            .collect())
    }

    pub async fn create_artwork(&self, input: NewArtwork) -> Result<artworks::Model, AppError> {
        let artwork = artworks::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(input.title),
            description: Set(input.description),
            image_url: Set(input.image_url),
            filename: Set(input.filename),
            creator_id: Set(input.creator_id),
            folder_id: Set(input.folder_id),
            created_at: Set(Utc::now()),
        };
        Ok(artwork.insert(&self.db).await?)
    }

    pub async fn update_artwork(
        &self,
        artwork: artworks::Model,
        patch: ArtworkPatch,
    ) -> Result<artworks::Model, AppError> {
        let mut active: artworks::ActiveModel = artwork.into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(folder_id) = patch.folder_id {
            active.folder_id = Set(folder_id);
        }
        Ok(active.update(&self.db).await?)
    }

    /// Deletes the row, then the backing asset best-effort.
    pub async fn delete_artwork(&self, artwork: artworks::Model) -> Result<(), AppError> {
        Artworks::delete_by_id(&artwork.id).exec(&self.db).await?;
        self.delete_asset_best_effort(&artwork.image_url).await;
        Ok(())
    }
}
