//! PostgreSQL-backed `ListingRepository` adapter using Diesel.
//!
//! Browse filters are applied twice per page request, once for the page rows
//! and once for the match count; the `apply_listing_filters!` macro keeps
//! the two query shapes identical.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::account::UserId;
use crate::domain::listing::{
    CarCategory, CategoryCount, Listing, ListingChanges, ListingFilter, ListingId, ListingSort,
    PageRequest,
};
use crate::domain::ports::{ListingRepository, ListingRepositoryError};

use super::models::{ListingChangeset, ListingRow, row_to_listing};
use super::pool::{DbPool, PoolError};
use super::schema::car_listings;

/// Diesel implementation of the listing persistence port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a repository over the shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ListingRepositoryError {
    ListingRepositoryError::connection(error.to_string())
}

fn map_diesel_error(error: DieselError) -> ListingRepositoryError {
    debug!(error = %error, "listing query failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ListingRepositoryError::connection("database connection error")
        }
        _ => ListingRepositoryError::query("database error"),
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Apply the browse filter predicates to a boxed listings query.
///
/// Written as a macro because the page query and the count query box to
/// different statement types.
macro_rules! apply_listing_filters {
    ($query:expr, $filter:expr) => {{
        let mut query = $query;
        if let Some(term) = &$filter.name_contains {
            query = query.filter(car_listings::name.ilike(format!("%{}%", escape_like(term))));
        }
        if let Some(category) = $filter.category {
            query = query.filter(car_listings::category.eq(category.as_str()));
        }
        if $filter.featured_only {
            query = query.filter(car_listings::featured.eq(true));
        }
        if let Some(min) = $filter.price_min {
            query = query.filter(car_listings::price.ge(min));
        }
        if let Some(max) = $filter.price_max {
            query = query.filter(car_listings::price.le(max));
        }
        query
    }};
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ListingRow::from(listing);
        diesel::insert_into(car_listings::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ListingRow> = car_listings::table
            .find(*id.as_uuid())
            .select(ListingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_listing).transpose()
    }

    async fn find_page(
        &self,
        filter: &ListingFilter,
        sort: ListingSort,
        page: &PageRequest,
    ) -> Result<(Vec<Listing>, u64), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = apply_listing_filters!(car_listings::table.count().into_boxed(), filter)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let query = apply_listing_filters!(
            car_listings::table
                .select(ListingRow::as_select())
                .into_boxed(),
            filter
        );
        let query = match sort {
            ListingSort::PriceAsc => query.order(car_listings::price.asc()),
            ListingSort::PriceDesc => query.order(car_listings::price.desc()),
            ListingSort::YearAsc => query.order(car_listings::year.asc()),
            ListingSort::YearDesc => query.order(car_listings::year.desc()),
        };
        let rows: Vec<ListingRow> = query
            .offset(page.offset())
            .limit(page.limit())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let listings = rows
            .into_iter()
            .map(row_to_listing)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((listings, total.max(0) as u64))
    }

    async fn find_by_seller(
        &self,
        seller: &UserId,
    ) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ListingRow> = car_listings::table
            .filter(car_listings::seller_id.eq(*seller.as_uuid()))
            .order(car_listings::created_at.desc())
            .select(ListingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_listing).collect()
    }

    async fn update(
        &self,
        id: &ListingId,
        changes: &ListingChanges,
    ) -> Result<bool, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = ListingChangeset::from(changes);
        let affected = diesel::update(car_listings::table.find(*id.as_uuid()))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(car_listings::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete_by_seller(&self, seller: &UserId) -> Result<u64, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected =
            diesel::delete(car_listings::table.filter(car_listings::seller_id.eq(*seller.as_uuid())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        Ok(affected as u64)
    }

    async fn count_by_category(&self) -> Result<Vec<CategoryCount>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, i64)> = car_listings::table
            .group_by(car_listings::category)
            .select((car_listings::category, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let counts = rows
            .into_iter()
            .filter_map(|(raw, count)| match CarCategory::parse(&raw) {
                Ok(category) => Some(CategoryCount {
                    category,
                    count: count.max(0) as u64,
                }),
                Err(_) => {
                    warn!(category = raw, "ignoring unrecognised category in aggregation");
                    None
                }
            })
            .collect();
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_honda\\"), "100\\%\\_honda\\\\");
    }
}
