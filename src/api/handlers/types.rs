//! Response shapes shared across handler modules. Entities never serialize
//! directly; every payload goes through these camelCase DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::entities::{artworks, folders, users};
use crate::services::gallery::{ArtworkWithRelations, FolderWithMeta, UserWithCounts};

/// Distinguishes an absent key from an explicit `null` in PATCH-style
/// payloads: absent stays `None` (via `#[serde(default)]`), `null` becomes
/// `Some(None)` and clears the field.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
}

impl CreatorInfo {
    pub fn from_user(user: &users::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            is_paused: None,
        }
    }

    /// Admin listings additionally expose the pause flag.
    pub fn from_user_admin(user: &users::Model) -> Self {
        Self {
            is_paused: Some(user.is_paused),
            ..Self::from_user(user)
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FolderBrief {
    pub id: String,
    pub name: String,
}

impl FolderBrief {
    pub fn from_folder(folder: &folders::Model) -> Self {
        Self {
            id: folder.id.clone(),
            name: folder.name.clone(),
        }
    }
}

/// Derived counts, recomputed per read; serialized as `_count` to match the
/// shape clients already consume.
#[derive(Serialize, ToSchema)]
pub struct CountInfo {
    pub artworks: u64,
    pub folders: u64,
}

#[derive(Serialize, ToSchema)]
pub struct ArtworkCountInfo {
    pub artworks: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub filename: String,
    pub creator_id: String,
    pub folder_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderBrief>,
}

impl ArtworkResponse {
    pub fn from_model(artwork: artworks::Model) -> Self {
        Self {
            id: artwork.id,
            title: artwork.title,
            description: artwork.description,
            image_url: artwork.image_url,
            filename: artwork.filename,
            creator_id: artwork.creator_id,
            folder_id: artwork.folder_id,
            created_at: artwork.created_at,
            creator: None,
            folder: None,
        }
    }

    pub fn from_relations(related: ArtworkWithRelations) -> Self {
        let creator = related.creator.as_ref().map(CreatorInfo::from_user);
        let folder = related.folder.as_ref().map(FolderBrief::from_folder);
        Self {
            creator,
            folder,
            ..Self::from_model(related.artwork)
        }
    }

    pub fn from_relations_admin(related: ArtworkWithRelations) -> Self {
        let creator = related.creator.as_ref().map(CreatorInfo::from_user_admin);
        let folder = related.folder.as_ref().map(FolderBrief::from_folder);
        Self {
            creator,
            folder,
            ..Self::from_model(related.artwork)
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub creator_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorInfo>,
    #[serde(rename = "_count")]
    pub count: ArtworkCountInfo,
}

impl FolderResponse {
    pub fn from_meta(meta: FolderWithMeta) -> Self {
        Self {
            id: meta.folder.id,
            name: meta.folder.name,
            description: meta.folder.description,
            creator_id: meta.folder.creator_id,
            created_at: meta.folder.created_at,
            creator: meta.creator.as_ref().map(CreatorInfo::from_user),
            count: ArtworkCountInfo {
                artworks: meta.artwork_count,
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub is_paused: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "_count")]
    pub count: CountInfo,
}

impl UserResponse {
    pub fn from_counts(with_counts: UserWithCounts) -> Self {
        Self {
            id: with_counts.user.id,
            email: with_counts.user.email,
            name: with_counts.user.name,
            avatar_url: with_counts.user.avatar_url,
            is_admin: with_counts.user.is_admin,
            is_paused: with_counts.user.is_paused,
            created_at: with_counts.user.created_at,
            count: CountInfo {
                artworks: with_counts.artwork_count,
                folders: with_counts.folder_count,
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
