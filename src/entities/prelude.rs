pub use super::artworks::Entity as Artworks;
pub use super::folders::Entity as Folders;
pub use super::users::Entity as Users;
