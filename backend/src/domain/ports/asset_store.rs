//! Port for binary asset storage adapters.

use async_trait::async_trait;

use crate::domain::asset::{AssetRef, ImageUpload};

use super::define_port_error;

define_port_error! {
    /// Storage errors raised by asset store adapters.
    pub enum AssetStoreError {
        /// The file could not be written.
        Write { message: String } => "asset write failed: {message}",
        /// The file could not be removed.
        Delete { message: String } => "asset delete failed: {message}",
    }
}

/// Port for saving, deleting, and probing stored assets.
///
/// Deletion is best-effort by contract: callers log failures and continue,
/// so adapters report a missing file as `Ok(false)` rather than an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist an upload under a freshly generated name and return its
    /// reference.
    async fn save(&self, upload: &ImageUpload) -> Result<AssetRef, AssetStoreError>;

    /// Remove a stored asset. Returns `false` when the reference is not
    /// managed by this store or the file is already gone.
    async fn delete(&self, reference: &AssetRef) -> Result<bool, AssetStoreError>;

    /// Whether the referenced file is currently present.
    async fn exists(&self, reference: &AssetRef) -> bool;
}

/// Fixture store that accepts every upload and deletes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssetStore;

#[async_trait]
impl AssetStore for FixtureAssetStore {
    async fn save(&self, upload: &ImageUpload) -> Result<AssetRef, AssetStoreError> {
        Ok(AssetRef::managed(&format!(
            "fixture.{}",
            upload.extension()
        )))
    }

    async fn delete(&self, _reference: &AssetRef) -> Result<bool, AssetStoreError> {
        Ok(true)
    }

    async fn exists(&self, _reference: &AssetRef) -> bool {
        true
    }
}
