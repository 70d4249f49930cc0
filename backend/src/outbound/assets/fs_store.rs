//! Filesystem-backed asset store.
//!
//! All access goes through a capability-scoped directory handle opened at
//! startup, so the store cannot read or write outside its root regardless of
//! what ends up in a reference string.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::asset::{AssetRef, ImageUpload};
use crate::domain::ports::{AssetStore, AssetStoreError};

/// Asset store writing uploads into a single directory under generated
/// names.
pub struct FsAssetStore {
    dir: Dir,
}

impl FsAssetStore {
    /// Open (creating if needed) the upload directory.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn save(&self, upload: &ImageUpload) -> Result<AssetRef, AssetStoreError> {
        let file_name = format!("{}.{}", Uuid::new_v4().simple(), upload.extension());
        self.dir
            .write(&file_name, upload.bytes())
            .map_err(|write_error| AssetStoreError::write(write_error.to_string()))?;
        debug!(file = file_name, size = upload.bytes().len(), "asset stored");
        Ok(AssetRef::managed(&file_name))
    }

    async fn delete(&self, reference: &AssetRef) -> Result<bool, AssetStoreError> {
        let Some(file_name) = reference.file_name() else {
            // External references (placeholders) are not ours to delete.
            return Ok(false);
        };
        match self.dir.remove_file(file_name) {
            Ok(()) => Ok(true),
            Err(remove_error) if remove_error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(remove_error) => Err(AssetStoreError::delete(remove_error.to_string())),
        }
    }

    async fn exists(&self, reference: &AssetRef) -> bool {
        reference
            .file_name()
            .is_some_and(|file_name| self.dir.metadata(file_name).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsAssetStore) {
        let root = tempfile::tempdir().expect("temp dir");
        let store = FsAssetStore::open(root.path()).expect("open store");
        (root, store)
    }

    fn upload() -> ImageUpload {
        ImageUpload::new("listing.png", vec![137, 80, 78, 71]).expect("valid upload")
    }

    #[tokio::test]
    async fn saves_under_a_generated_name_preserving_the_extension() {
        let (_root, store) = store();
        let reference = store.save(&upload()).await.expect("saved");
        assert!(reference.is_managed());
        assert!(reference.as_ref().ends_with(".png"));
        assert!(store.exists(&reference).await);
    }

    #[tokio::test]
    async fn two_saves_never_collide() {
        let (_root, store) = store();
        let first = store.save(&upload()).await.expect("saved");
        let second = store.save(&upload()).await.expect("saved");
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_root, store) = store();
        let reference = store.save(&upload()).await.expect("saved");
        assert!(store.delete(&reference).await.expect("first delete"));
        assert!(!store.delete(&reference).await.expect("second delete"));
        assert!(!store.exists(&reference).await);
    }

    #[tokio::test]
    async fn external_references_are_never_touched() {
        let (_root, store) = store();
        let reference = AssetRef::new("https://example.test/car.png").expect("valid reference");
        assert!(!store.delete(&reference).await.expect("no-op"));
        assert!(!store.exists(&reference).await);
    }
}
