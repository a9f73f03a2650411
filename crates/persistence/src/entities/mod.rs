//! Database row mappings.

pub mod asset;
pub mod asset_changelog;
pub mod user;

pub use asset::AssetEntity;
pub use asset_changelog::AssetChangelogEntity;
pub use user::UserProfileEntity;
