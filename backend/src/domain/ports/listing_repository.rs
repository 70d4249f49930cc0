//! Port for car listing persistence adapters.

use async_trait::async_trait;

use crate::domain::account::UserId;
use crate::domain::listing::{
    CategoryCount, Listing, ListingChanges, ListingFilter, ListingId, ListingSort, PageRequest,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by listing repository adapters.
    pub enum ListingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "listing repository query failed: {message}",
    }
}

/// Port for listing storage, browse queries, and aggregation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Persist a new listing.
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError>;

    /// Fetch a listing by identifier.
    async fn find_by_id(&self, id: &ListingId)
    -> Result<Option<Listing>, ListingRepositoryError>;

    /// Fetch one page of matches plus the total match count.
    async fn find_page(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        page: &PageRequest,
    ) -> Result<(Vec<Listing>, u64), ListingRepositoryError>;

    /// Fetch every listing owned by a seller.
    async fn find_by_seller(&self, seller: &UserId)
    -> Result<Vec<Listing>, ListingRepositoryError>;

    /// Apply changes to a listing. Returns `false` when it does not exist.
    async fn update(
        &self,
        id: &ListingId,
        changes: &ListingChanges,
    ) -> Result<bool, ListingRepositoryError>;

    /// Delete one listing. Returns `false` when it was already gone.
    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError>;

    /// Delete every listing owned by a seller, returning the count removed.
    async fn delete_by_seller(&self, seller: &UserId) -> Result<u64, ListingRepositoryError>;

    /// Count listings per category.
    async fn count_by_category(&self) -> Result<Vec<CategoryCount>, ListingRepositoryError>;
}

/// Fixture implementation for tests that do not exercise listing storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListingRepository;

#[async_trait]
impl ListingRepository for FixtureListingRepository {
    async fn insert(&self, _listing: &Listing) -> Result<(), ListingRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        Ok(None)
    }

    async fn find_page(
        &self,
        _filter: &ListingFilter,
        _sort: ListingSort,
        _page: &PageRequest,
    ) -> Result<(Vec<Listing>, u64), ListingRepositoryError> {
        Ok((Vec::new(), 0))
    }

    async fn find_by_seller(
        &self,
        _seller: &UserId,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        Ok(Vec::new())
    }

    async fn update(
        &self,
        _id: &ListingId,
        _changes: &ListingChanges,
    ) -> Result<bool, ListingRepositoryError> {
        Ok(true)
    }

    async fn delete(&self, _id: &ListingId) -> Result<bool, ListingRepositoryError> {
        Ok(true)
    }

    async fn delete_by_seller(&self, _seller: &UserId) -> Result<u64, ListingRepositoryError> {
        Ok(0)
    }

    async fn count_by_category(&self) -> Result<Vec<CategoryCount>, ListingRepositoryError> {
        Ok(Vec::new())
    }
}
