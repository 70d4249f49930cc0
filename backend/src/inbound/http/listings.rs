//! Listing endpoints: submit, browse, fetch, update, and delete.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::listing::{
    CarCategory, Listing, ListingFields, ListingFilter, ListingPatch, ListingSort, PageEnvelope,
    PageRequest,
};
use crate::domain::{Error, ListingDraft};

use super::auth::Identity;
use super::error::ApiResult;
use super::state::HttpState;
use super::uploads::{ImagePayload, decode_images};

/// Page size applied when the query does not name one.
const DEFAULT_PAGE_SIZE: u32 = 9;

/// External representation of a listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
    /// Listing identifier.
    pub id: String,
    /// Listing headline name.
    pub name: String,
    /// Where the car is located.
    pub location: String,
    /// Asking price.
    pub price: i64,
    /// Model year.
    pub year: i32,
    /// Odometer reading.
    pub mileage: i64,
    /// Fuel type.
    pub fuel: String,
    /// Transmission type.
    pub transmission: String,
    /// Browse category.
    pub category: String,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Optional free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered image references.
    pub images: Vec<String>,
    /// Whether the listing is promoted.
    pub featured: bool,
    /// Owning seller identifier.
    pub seller_id: String,
    /// Whole days since the listing was created.
    pub posted_days: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Listing> for ListingDto {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.to_string(),
            name: listing.name.clone(),
            location: listing.location.clone(),
            price: listing.price,
            year: listing.year,
            mileage: listing.mileage,
            fuel: listing.fuel.clone(),
            transmission: listing.transmission.clone(),
            category: listing.category.as_str().to_owned(),
            make: listing.make.clone(),
            model: listing.model.clone(),
            description: listing.description.clone(),
            images: listing
                .images
                .iter()
                .map(|reference| reference.as_ref().to_owned())
                .collect(),
            featured: listing.featured,
            seller_id: listing.seller_id.to_string(),
            posted_days: listing.days_posted(),
            created_at: listing.created_at,
        }
    }
}

/// Request body for `POST /api/v1/listings`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    /// Listing headline name.
    pub name: String,
    /// Where the car is located.
    pub location: String,
    /// Asking price.
    pub price: i64,
    /// Model year.
    pub year: i32,
    /// Odometer reading.
    pub mileage: i64,
    /// Fuel type.
    pub fuel: String,
    /// Transmission type.
    pub transmission: String,
    /// Browse category.
    pub category: String,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Uploaded images.
    #[serde(default)]
    pub images: Vec<ImagePayload>,
}

/// Request body for `PUT /api/v1/listings/{id}`; absent fields are kept.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement location.
    pub location: Option<String>,
    /// Replacement price.
    pub price: Option<i64>,
    /// Replacement year.
    pub year: Option<i32>,
    /// Replacement mileage.
    pub mileage: Option<i64>,
    /// Replacement fuel type.
    pub fuel: Option<String>,
    /// Replacement transmission type.
    pub transmission: Option<String>,
    /// Replacement category.
    pub category: Option<String>,
    /// Replacement make.
    pub make: Option<String>,
    /// Replacement model.
    pub model: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement featured flag.
    pub featured: Option<bool>,
    /// Replacement image set; supplying any replaces all stored images.
    pub images: Option<Vec<ImagePayload>>,
}

impl UpdateListingRequest {
    fn into_patch(self) -> Result<(ListingPatch, Option<Vec<ImagePayload>>), Error> {
        let category = self
            .category
            .map(|raw| CarCategory::parse(&raw))
            .transpose()
            .map_err(Error::from)?;
        let patch = ListingPatch {
            name: self.name,
            location: self.location,
            price: self.price,
            year: self.year,
            mileage: self.mileage,
            fuel: self.fuel,
            transmission: self.transmission,
            category,
            make: self.make,
            model: self.model,
            description: self.description,
            featured: self.featured,
        };
        Ok((patch, self.images))
    }
}

/// Browse query parameters for `GET /api/v1/listings`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    /// Case-insensitive substring match on the listing name.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Only featured listings.
    #[serde(default)]
    pub featured: bool,
    /// Inclusive lower price bound.
    pub min_price: Option<i64>,
    /// Inclusive upper price bound.
    pub max_price: Option<i64>,
    /// Sort key; defaults to `price_asc`.
    pub sort: Option<String>,
    /// 1-indexed page; defaults to 1.
    pub page: Option<u32>,
    /// Page size; defaults to 9.
    pub page_size: Option<u32>,
}

/// One page of browse results.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrowsePage {
    /// Listings on this page, in sort order.
    pub items: Vec<ListingDto>,
    /// Total number of matches.
    pub total: u64,
    /// Total page count.
    pub total_pages: u64,
    /// Echoed page number.
    pub page: u32,
    /// Echoed page size.
    pub page_size: u32,
}

impl From<PageEnvelope<Listing>> for BrowsePage {
    fn from(envelope: PageEnvelope<Listing>) -> Self {
        Self {
            items: envelope.items.iter().map(ListingDto::from).collect(),
            total: envelope.total,
            total_pages: envelope.total_pages,
            page: envelope.page,
            page_size: envelope.page_size,
        }
    }
}

/// Per-category listing count.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCountDto {
    /// Category display name.
    pub category: String,
    /// Number of listings filed under it.
    pub count: u64,
}

/// Submit a new listing.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created", body = ListingDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Authentication required", body = Error)
    ),
    tags = ["listings"],
    security(("BearerToken" = []))
)]
#[post("/listings")]
pub async fn create_listing(
    identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<CreateListingRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = ListingDraft::new(ListingFields {
        name: body.name,
        location: body.location,
        price: body.price,
        year: body.year,
        mileage: body.mileage,
        fuel: body.fuel,
        transmission: body.transmission,
        category: body.category,
        make: body.make,
        model: body.model,
        description: body.description,
    })
    .map_err(Error::from)?;
    let uploads = decode_images(body.images)?;

    let listing = state.listings.create(identity.0, draft, uploads).await?;
    Ok(HttpResponse::Created().json(ListingDto::from(&listing)))
}

/// Browse listings with filters, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    params(BrowseQuery),
    responses(
        (status = 200, description = "One page of listings", body = BrowsePage),
        (status = 400, description = "Invalid filter or pagination", body = Error)
    ),
    tags = ["listings"],
    security([])
)]
#[get("/listings")]
pub async fn browse_listings(
    state: web::Data<HttpState>,
    query: web::Query<BrowseQuery>,
) -> ApiResult<web::Json<BrowsePage>> {
    let query = query.into_inner();
    let category = query
        .category
        .map(|raw| CarCategory::parse(&raw))
        .transpose()
        .map_err(Error::from)?;
    let sort = query
        .sort
        .map(|raw| ListingSort::parse(&raw))
        .transpose()
        .map_err(Error::from)?
        .unwrap_or_default();
    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .map_err(Error::from)?;
    let filter = ListingFilter {
        name_contains: query.search,
        category,
        featured_only: query.featured,
        price_min: query.min_price,
        price_max: query.max_price,
    };

    let envelope = state.listings.browse(&filter, sort, &page).await?;
    Ok(web::Json(BrowsePage::from(envelope)))
}

/// Listing counts per category for the browse tiles.
#[utoipa::path(
    get,
    path = "/api/v1/listings/categories",
    responses(
        (status = 200, description = "Counts per category", body = [CategoryCountDto])
    ),
    tags = ["listings"],
    security([])
)]
#[get("/listings/categories")]
pub async fn category_counts(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryCountDto>>> {
    let counts = state.listings.category_counts().await?;
    Ok(web::Json(
        counts
            .into_iter()
            .map(|count| CategoryCountDto {
                category: count.category.as_str().to_owned(),
                count: count.count,
            })
            .collect(),
    ))
}

/// Fetch a single listing.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "The listing", body = ListingDto),
        (status = 404, description = "Unknown listing", body = Error)
    ),
    tags = ["listings"],
    security([])
)]
#[get("/listings/{id}")]
pub async fn get_listing(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ListingDto>> {
    let listing = state.listings.get(&path.into_inner()).await?;
    Ok(web::Json(ListingDto::from(&listing)))
}

/// Update an owned listing; new images replace the stored set entirely.
#[utoipa::path(
    put,
    path = "/api/v1/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Updated listing", body = ListingDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Authentication required", body = Error),
        (status = 404, description = "Unknown or foreign listing", body = Error)
    ),
    tags = ["listings"],
    security(("BearerToken" = []))
)]
#[put("/listings/{id}")]
pub async fn update_listing(
    identity: Identity,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateListingRequest>,
) -> ApiResult<web::Json<ListingDto>> {
    let (patch, images) = payload.into_inner().into_patch()?;
    let uploads = images.map(decode_images).transpose()?;
    let listing = state
        .listings
        .update(&identity.0, &path.into_inner(), patch, uploads)
        .await?;
    Ok(web::Json(ListingDto::from(&listing)))
}

/// Delete an owned listing and its stored images.
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Listing deleted"),
        (status = 401, description = "Authentication required", body = Error),
        (status = 404, description = "Unknown or foreign listing", body = Error)
    ),
    tags = ["listings"],
    security(("BearerToken" = []))
)]
#[delete("/listings/{id}")]
pub async fn delete_listing(
    identity: Identity,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state
        .listings
        .delete(&identity.0, &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Listing deleted" })))
}
