//! Listing lifecycle service: create, fetch, browse, update, and delete.
//!
//! Multi-step mutations here are deliberately best-effort sequences, not
//! transactions: replacing a listing's images deletes the old files before
//! the new set is written, and deleting a listing removes its files before
//! the document. Each step is isolated so partial-failure behaviour stays
//! observable.

use std::sync::Arc;

use tracing::{error, warn};

use super::account::UserId;
use super::asset::{AssetRef, ImageUpload};
use super::error::Error;
use super::listing::{
    CategoryCount, Listing, ListingChanges, ListingDraft, ListingFilter, ListingId, ListingPatch,
    ListingSort, PageEnvelope, PageRequest,
};
use super::ports::{AssetStore, ListingRepository, ListingRepositoryError};

/// Orchestrates listing mutations across the repository and the asset store.
#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingRepository>,
    assets: Arc<dyn AssetStore>,
    placeholder_image: Option<AssetRef>,
}

fn map_repository_error(error: ListingRepositoryError) -> Error {
    error!(error = %error, "listing repository failure");
    match error {
        ListingRepositoryError::Connection { message } => Error::service_unavailable(message),
        ListingRepositoryError::Query { message } => Error::internal(message),
    }
}

fn not_found() -> Error {
    // Absence and foreign ownership share one message so callers cannot
    // probe for other sellers' listings.
    Error::not_found("listing not found")
}

impl ListingService {
    /// Create the service over its two ports.
    ///
    /// When `placeholder_image` is set, submissions without files fall back
    /// to it; otherwise such submissions are rejected.
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        assets: Arc<dyn AssetStore>,
        placeholder_image: Option<AssetRef>,
    ) -> Self {
        Self {
            listings,
            assets,
            placeholder_image,
        }
    }

    /// Persist a new listing owned by `seller`.
    ///
    /// Uploads were validated at the boundary; every file is stored before
    /// the document is written, and a storage failure rolls the stored files
    /// back best-effort so no partial upload survives.
    pub async fn create(
        &self,
        seller: UserId,
        draft: ListingDraft,
        uploads: Vec<ImageUpload>,
    ) -> Result<Listing, Error> {
        let images = if uploads.is_empty() {
            match &self.placeholder_image {
                Some(placeholder) => vec![placeholder.clone()],
                None => {
                    return Err(Error::invalid_field(
                        "images",
                        "at least one image is required",
                    ));
                }
            }
        } else {
            self.store_uploads(&uploads).await?
        };

        let listing = Listing::from_draft(draft, seller, images);
        self.listings
            .insert(&listing)
            .await
            .map_err(map_repository_error)?;
        Ok(listing)
    }

    /// Fetch a listing by its raw identifier.
    ///
    /// Malformed and unknown identifiers are indistinguishable.
    pub async fn get(&self, raw_id: &str) -> Result<Listing, Error> {
        let id = ListingId::parse(raw_id).map_err(|_| not_found())?;
        self.listings
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(not_found)
    }

    /// Fetch one page of listings matching the filter.
    pub async fn browse(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        page: &PageRequest,
    ) -> Result<PageEnvelope<Listing>, Error> {
        let (items, total) = self
            .listings
            .find_page(filter, sort, page)
            .await
            .map_err(map_repository_error)?;
        Ok(PageEnvelope::new(items, total, page))
    }

    /// Count listings per category for the browse tiles.
    pub async fn category_counts(&self) -> Result<Vec<CategoryCount>, Error> {
        self.listings
            .count_by_category()
            .await
            .map_err(map_repository_error)
    }

    /// Apply a partial update on behalf of `caller`.
    ///
    /// When `new_images` is supplied, every previously stored image is
    /// deleted before the replacement set is written (replace, not merge).
    pub async fn update(
        &self,
        caller: &UserId,
        raw_id: &str,
        patch: ListingPatch,
        new_images: Option<Vec<ImageUpload>>,
    ) -> Result<Listing, Error> {
        if patch.is_empty() && new_images.is_none() {
            return Err(Error::invalid_request("no recognised field supplied"));
        }
        patch.validate().map_err(Error::from)?;
        if new_images.as_deref().is_some_and(<[ImageUpload]>::is_empty) {
            return Err(Error::invalid_field(
                "images",
                "at least one image is required",
            ));
        }

        let listing = self.fetch_owned(caller, raw_id).await?;

        let images = match new_images {
            Some(uploads) => {
                // Replace-not-merge: old files go first. A crash between the
                // two steps can strand the listing without images; accepted.
                self.remove_listing_assets(&listing).await;
                Some(self.store_uploads(&uploads).await?)
            }
            None => None,
        };

        let changes = ListingChanges { patch, images };
        let updated = self
            .listings
            .update(&listing.id, &changes)
            .await
            .map_err(map_repository_error)?;
        if !updated {
            return Err(not_found());
        }

        self.listings
            .find_by_id(&listing.id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(not_found)
    }

    /// Delete a listing on behalf of `caller`.
    ///
    /// Assets are removed before the document; stranded files from a crash
    /// mid-sequence are tolerated, a dangling document is not.
    pub async fn delete(&self, caller: &UserId, raw_id: &str) -> Result<(), Error> {
        let listing = self.fetch_owned(caller, raw_id).await?;
        self.remove_listing_assets(&listing).await;
        self.listings
            .delete(&listing.id)
            .await
            .map_err(map_repository_error)?;
        Ok(())
    }

    /// Fetch a listing and enforce that `caller` owns it.
    async fn fetch_owned(&self, caller: &UserId, raw_id: &str) -> Result<Listing, Error> {
        let listing = self.get(raw_id).await?;
        if listing.seller_id != *caller {
            return Err(not_found());
        }
        Ok(listing)
    }

    /// Store every upload, rolling already-stored files back on failure.
    async fn store_uploads(&self, uploads: &[ImageUpload]) -> Result<Vec<AssetRef>, Error> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.assets.save(upload).await {
                Ok(reference) => stored.push(reference),
                Err(save_error) => {
                    error!(
                        error = %save_error,
                        file = upload.file_name(),
                        "image store failed; rolling back stored files"
                    );
                    for reference in &stored {
                        if let Err(cleanup_error) = self.assets.delete(reference).await {
                            warn!(
                                error = %cleanup_error,
                                reference = %reference,
                                "rollback of stored image failed"
                            );
                        }
                    }
                    return Err(Error::internal("failed to store uploaded images"));
                }
            }
        }
        Ok(stored)
    }

    /// Delete every asset a listing references, continuing past failures.
    async fn remove_listing_assets(&self, listing: &Listing) {
        for reference in &listing.images {
            match self.assets.delete(reference).await {
                Ok(_) => {}
                Err(delete_error) => warn!(
                    error = %delete_error,
                    reference = %reference,
                    listing = %listing.id,
                    "listing image deletion failed; continuing"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::listing::ListingFields;
    use crate::domain::ports::{
        AssetStoreError, FixtureAssetStore, MockAssetStore, MockListingRepository,
    };
    use rstest::rstest;

    fn draft() -> ListingDraft {
        ListingDraft::new(ListingFields {
            name: "Suzuki Swift DLX".into(),
            location: "Karachi".into(),
            price: 3_150_000,
            year: 2020,
            mileage: 58_000,
            fuel: "Petrol".into(),
            transmission: "Manual".into(),
            category: "Hatchbacks".into(),
            make: "Suzuki".into(),
            model: "Swift".into(),
            description: None,
        })
        .expect("valid draft")
    }

    fn upload(name: &str) -> ImageUpload {
        ImageUpload::new(name, vec![1u8, 2, 3]).expect("valid upload")
    }

    fn listing_for(seller: UserId) -> Listing {
        Listing::from_draft(
            draft(),
            seller,
            vec![AssetRef::managed("a.png"), AssetRef::managed("b.png")],
        )
    }

    fn service(
        listings: MockListingRepository,
        assets: MockAssetStore,
    ) -> ListingService {
        ListingService::new(Arc::new(listings), Arc::new(assets), None)
    }

    #[tokio::test]
    async fn create_stores_files_then_document() {
        let mut listings = MockListingRepository::new();
        listings.expect_insert().times(1).return_once(|_| Ok(()));
        let service = ListingService::new(
            Arc::new(listings),
            Arc::new(FixtureAssetStore),
            None,
        );

        let seller = UserId::random();
        let listing = service
            .create(seller, draft(), vec![upload("one.png"), upload("two.jpg")])
            .await
            .expect("created");

        assert_eq!(listing.images.len(), 2);
        assert_eq!(listing.seller_id, seller);
        assert!(!listing.featured);
    }

    #[tokio::test]
    async fn create_without_files_is_rejected_when_no_placeholder() {
        let mut listings = MockListingRepository::new();
        listings.expect_insert().times(0);
        let service = service(listings, MockAssetStore::new());

        let error = service
            .create(UserId::random(), draft(), Vec::new())
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn create_without_files_uses_the_configured_placeholder() {
        let mut listings = MockListingRepository::new();
        listings.expect_insert().times(1).return_once(|_| Ok(()));
        let placeholder =
            AssetRef::new("https://example.test/placeholder.png").expect("valid reference");
        let service = ListingService::new(
            Arc::new(listings),
            Arc::new(MockAssetStore::new()),
            Some(placeholder.clone()),
        );

        let listing = service
            .create(UserId::random(), draft(), Vec::new())
            .await
            .expect("created");
        assert_eq!(listing.images, vec![placeholder]);
    }

    #[tokio::test]
    async fn create_rolls_back_stored_files_when_one_save_fails() {
        let mut assets = MockAssetStore::new();
        let mut saves = 0u32;
        assets.expect_save().times(2).returning(move |_| {
            saves += 1;
            if saves == 1 {
                Ok(AssetRef::managed("first.png"))
            } else {
                Err(AssetStoreError::write("disk full"))
            }
        });
        assets
            .expect_delete()
            .withf(|reference| reference.file_name() == Some("first.png"))
            .times(1)
            .return_once(|_| Ok(true));
        let mut listings = MockListingRepository::new();
        listings.expect_insert().times(0);

        let service = service(listings, assets);
        let error = service
            .create(
                UserId::random(),
                draft(),
                vec![upload("one.png"), upload("two.png")],
            )
            .await
            .expect_err("failure");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn get_round_trips_a_stored_listing() {
        let seller = UserId::random();
        let stored = listing_for(seller);
        let expected = stored.clone();
        let mut listings = MockListingRepository::new();
        listings
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(stored)));

        let service = service(listings, MockAssetStore::new());
        let fetched = service.get(&expected.id.to_string()).await.expect("found");
        assert_eq!(fetched, expected);
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    #[tokio::test]
    async fn get_treats_malformed_ids_as_not_found(#[case] raw: &str) {
        let service = service(MockListingRepository::new(), MockAssetStore::new());
        let error = service.get(raw).await.expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_by_non_owner_is_indistinguishable_from_absence() {
        let stored = listing_for(UserId::random());
        let id = stored.id;
        let mut listings = MockListingRepository::new();
        listings
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        listings.expect_update().times(0);

        let service = service(listings, MockAssetStore::new());
        let patch = ListingPatch {
            price: Some(100),
            ..ListingPatch::default()
        };
        let error = service
            .update(&UserId::random(), &id.to_string(), patch, None)
            .await
            .expect_err("denied");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "listing not found");
    }

    #[tokio::test]
    async fn update_with_new_images_deletes_old_files_first() {
        let seller = UserId::random();
        let stored = listing_for(seller);
        let id = stored.id;
        let refreshed = stored.clone();

        let mut assets = MockAssetStore::new();
        // Two old files removed, then the replacement is written.
        assets.expect_delete().times(2).returning(|_| Ok(true));
        assets
            .expect_save()
            .times(1)
            .return_once(|_| Ok(AssetRef::managed("new.png")));

        let mut listings = MockListingRepository::new();
        let mut lookups = 0u32;
        listings.expect_find_by_id().times(2).returning(move |_| {
            lookups += 1;
            if lookups == 1 {
                Ok(Some(stored.clone()))
            } else {
                let mut updated = refreshed.clone();
                updated.images = vec![AssetRef::managed("new.png")];
                Ok(Some(updated))
            }
        });
        listings
            .expect_update()
            .withf(|_, changes| {
                changes
                    .images
                    .as_deref()
                    .is_some_and(|images| images == [AssetRef::managed("new.png")].as_slice())
            })
            .times(1)
            .return_once(|_, _| Ok(true));

        let service = service(listings, assets);
        let updated = service
            .update(&seller, &id.to_string(), ListingPatch::default(), Some(vec![upload("new.png")]))
            .await
            .expect("updated");
        assert_eq!(updated.images, vec![AssetRef::managed("new.png")]);
    }

    #[tokio::test]
    async fn update_without_any_field_is_rejected() {
        let service = service(MockListingRepository::new(), MockAssetStore::new());
        let error = service
            .update(
                &UserId::random(),
                &ListingId::random().to_string(),
                ListingPatch::default(),
                None,
            )
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn delete_removes_assets_before_the_document() {
        let seller = UserId::random();
        let stored = listing_for(seller);
        let id = stored.id;

        let mut assets = MockAssetStore::new();
        assets.expect_delete().times(2).returning(|_| Ok(true));
        let mut listings = MockListingRepository::new();
        listings
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        listings.expect_delete().times(1).return_once(|_| Ok(true));

        let service = service(listings, assets);
        service
            .delete(&seller, &id.to_string())
            .await
            .expect("deleted");
    }

    #[tokio::test]
    async fn delete_continues_past_individual_file_failures() {
        let seller = UserId::random();
        let stored = listing_for(seller);
        let id = stored.id;

        let mut assets = MockAssetStore::new();
        let mut deletions = 0u32;
        assets.expect_delete().times(2).returning(move |_| {
            deletions += 1;
            if deletions == 1 {
                Err(AssetStoreError::delete("permission denied"))
            } else {
                Ok(true)
            }
        });
        let mut listings = MockListingRepository::new();
        listings
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        listings.expect_delete().times(1).return_once(|_| Ok(true));

        let service = service(listings, assets);
        service
            .delete(&seller, &id.to_string())
            .await
            .expect("deleted despite file failure");
    }

    #[tokio::test]
    async fn deleting_a_missing_listing_reports_not_found() {
        let mut listings = MockListingRepository::new();
        listings.expect_find_by_id().returning(|_| Ok(None));

        let service = service(listings, MockAssetStore::new());
        let error = service
            .delete(&UserId::random(), &ListingId::random().to_string())
            .await
            .expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn browse_wraps_the_page_in_an_envelope() {
        let seller = UserId::random();
        let items = vec![listing_for(seller)];
        let mut listings = MockListingRepository::new();
        listings
            .expect_find_page()
            .times(1)
            .return_once(move |_, _, _| Ok((items, 20)));

        let service = service(listings, MockAssetStore::new());
        let page = PageRequest::new(1, 9).expect("valid page");
        let envelope = service
            .browse(&ListingFilter::default(), ListingSort::default(), &page)
            .await
            .expect("page");
        assert_eq!(envelope.total, 20);
        assert_eq!(envelope.total_pages, 3);
        assert_eq!(envelope.items.len(), 1);
    }
}
