//! The authorization gate: one pure decision function for every mutation of
//! a shared resource. Handlers load the acting user fresh from the database,
//! build a `Principal`, and call [`ensure`] (or [`authorize`]) immediately
//! before acting; decisions are never cached.

use crate::api::error::AppError;
use crate::entities::users;

/// The resolved, freshly-loaded acting user.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub is_admin: bool,
    pub is_paused: bool,
}

impl Principal {
    pub fn from_user(user: &users::Model) -> Self {
        Self {
            user_id: user.id.clone(),
            is_admin: user.is_admin,
            is_paused: user.is_paused,
        }
    }
}

/// A requested mutation, carrying whatever resource state the rules need.
#[derive(Debug)]
pub enum Action<'a> {
    /// Edit or delete an artwork owned by `owner_id`
    MutateArtwork { owner_id: &'a str },
    /// Edit or delete a folder owned by `owner_id`
    MutateFolder { owner_id: &'a str },
    /// Create an artwork or folder, or upload an artwork image
    CreateContent,
    /// File an artwork under a folder: both owners must match
    FileIntoFolder {
        artwork_owner_id: &'a str,
        folder_owner_id: &'a str,
    },
    /// Administrative user update; `revokes_admin` when the patch clears the
    /// target's admin flag
    UpdateUser {
        target_id: &'a str,
        revokes_admin: bool,
    },
    /// Administrative user deletion (cascades)
    DeleteUser { target_id: &'a str },
    /// Administrative deletion of any artwork
    DeleteAnyArtwork,
    /// Administrative listings (users, all artworks)
    ViewAdminListings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotOwner,
    SelfProtect,
    AccountPaused,
    FolderNotOwned,
    AdminRequired,
}

/// Rules in flat precedence, most specific first:
///
/// 1. mutation by a principal who is neither owner nor admin → `NotOwner`
/// 2. self-demotion or self-deletion through the admin surface → `SelfProtect`,
///    admins included
/// 3. content creation while paused → `AccountPaused`
/// 4. filing an artwork into another user's folder → `FolderNotOwned`
/// 5. administrative actions without the admin flag → `AdminRequired`
/// 6. otherwise → `Allow`
pub fn authorize(principal: &Principal, action: &Action) -> Decision {
    use Action::*;

    match action {
        MutateArtwork { owner_id } | MutateFolder { owner_id } => {
            if *owner_id != principal.user_id && !principal.is_admin {
                return Decision::Deny(DenyReason::NotOwner);
            }
            Decision::Allow
        }
        UpdateUser {
            target_id,
            revokes_admin,
        } => {
            if *target_id == principal.user_id && *revokes_admin {
                return Decision::Deny(DenyReason::SelfProtect);
            }
            if !principal.is_admin {
                return Decision::Deny(DenyReason::AdminRequired);
            }
            Decision::Allow
        }
        DeleteUser { target_id } => {
            if *target_id == principal.user_id {
                return Decision::Deny(DenyReason::SelfProtect);
            }
            if !principal.is_admin {
                return Decision::Deny(DenyReason::AdminRequired);
            }
            Decision::Allow
        }
        CreateContent => {
            if principal.is_paused {
                return Decision::Deny(DenyReason::AccountPaused);
            }
            Decision::Allow
        }
        FileIntoFolder {
            artwork_owner_id,
            folder_owner_id,
        } => {
            if artwork_owner_id != folder_owner_id {
                return Decision::Deny(DenyReason::FolderNotOwned);
            }
            Decision::Allow
        }
        DeleteAnyArtwork | ViewAdminListings => {
            if !principal.is_admin {
                return Decision::Deny(DenyReason::AdminRequired);
            }
            Decision::Allow
        }
    }
}

/// [`authorize`] mapped into the error taxonomy, for use with `?`.
pub fn ensure(principal: &Principal, action: &Action) -> Result<(), AppError> {
    match authorize(principal, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(reason.into()),
    }
}
