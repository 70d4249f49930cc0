//! Car listing model: the aggregate, its validated inputs, and browse types.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::UserId;
use super::asset::AssetRef;

/// Earliest model year a listing may carry.
pub const MIN_LISTING_YEAR: i32 = 1900;

/// Validation errors raised by listing constructors and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingValidationError {
    /// The listing id was not a valid UUID.
    InvalidId,
    /// A required text field was empty after trimming.
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
    /// Price was zero or negative.
    InvalidPrice,
    /// Year fell outside `MIN_LISTING_YEAR ..= current year`.
    InvalidYear {
        /// Upper bound at validation time (the current year).
        max: i32,
    },
    /// Mileage was negative.
    InvalidMileage,
    /// The category matched none of the accepted values.
    UnknownCategory {
        /// Rejected raw value.
        value: String,
    },
    /// The sort key matched none of the accepted values.
    UnknownSort {
        /// Rejected raw value.
        value: String,
    },
    /// Page and page size must both be positive.
    InvalidPage,
    /// An update carried no recognised field.
    EmptyUpdate,
}

impl fmt::Display for ListingValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "listing id must be a valid UUID"),
            Self::EmptyField { field } => write!(f, "{field} is required"),
            Self::InvalidPrice => write!(f, "price must be a positive number"),
            Self::InvalidYear { max } => {
                write!(f, "year must be between {MIN_LISTING_YEAR} and {max}")
            }
            Self::InvalidMileage => write!(f, "mileage must be a non-negative number"),
            Self::UnknownCategory { value } => write!(
                f,
                "unknown category {value}; accepted: {}",
                CarCategory::ALL.map(|c| c.as_str()).join(", ")
            ),
            Self::UnknownSort { value } => write!(
                f,
                "unknown sort {value}; accepted: price_asc, price_desc, year_asc, year_desc"
            ),
            Self::InvalidPage => write!(f, "page and page size must be positive"),
            Self::EmptyUpdate => write!(f, "no recognised field supplied"),
        }
    }
}

impl std::error::Error for ListingValidationError {}

impl From<ListingValidationError> for super::Error {
    fn from(error: ListingValidationError) -> Self {
        let field = match &error {
            // Malformed ids are indistinguishable from absent listings.
            ListingValidationError::InvalidId => return Self::not_found("listing not found"),
            ListingValidationError::EmptyUpdate => {
                return Self::invalid_request(error.to_string());
            }
            ListingValidationError::EmptyField { field } => *field,
            ListingValidationError::InvalidPrice => "price",
            ListingValidationError::InvalidYear { .. } => "year",
            ListingValidationError::InvalidMileage => "mileage",
            ListingValidationError::UnknownCategory { .. } => "category",
            ListingValidationError::UnknownSort { .. } => "sort",
            ListingValidationError::InvalidPage => "page",
        };
        Self::invalid_field(field, error.to_string())
    }
}

/// Stable listing identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListingId(Uuid);

impl ListingId {
    /// Parse an identifier from its string form.
    pub fn parse(raw: &str) -> Result<Self, ListingValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| ListingValidationError::InvalidId)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ListingId> for String {
    fn from(value: ListingId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ListingId {
    type Error = ListingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Fixed set of browse categories a listing is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CarCategory {
    /// Sedans.
    Sedans,
    /// SUVs.
    Suvs,
    /// Hatchbacks.
    Hatchbacks,
    /// Luxury cars.
    LuxuryCars,
    /// Electric vehicles.
    Electric,
    /// Budget cars.
    BudgetCars,
}

impl CarCategory {
    /// Every accepted category, in display order.
    pub const ALL: [Self; 6] = [
        Self::Sedans,
        Self::Suvs,
        Self::Hatchbacks,
        Self::LuxuryCars,
        Self::Electric,
        Self::BudgetCars,
    ];

    /// Canonical display form, also the stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sedans => "Sedans",
            Self::Suvs => "SUVs",
            Self::Hatchbacks => "Hatchbacks",
            Self::LuxuryCars => "Luxury Cars",
            Self::Electric => "Electric",
            Self::BudgetCars => "Budget Cars",
        }
    }

    /// Parse a category by exact match against the accepted values.
    pub fn parse(raw: &str) -> Result<Self, ListingValidationError> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == raw)
            .ok_or_else(|| ListingValidationError::UnknownCategory {
                value: raw.to_owned(),
            })
    }
}

impl fmt::Display for CarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CarCategory> for String {
    fn from(value: CarCategory) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for CarCategory {
    type Error = ListingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

fn require(field: &'static str, value: String) -> Result<String, ListingValidationError> {
    if value.trim().is_empty() {
        return Err(ListingValidationError::EmptyField { field });
    }
    Ok(value)
}

fn check_price(price: i64) -> Result<i64, ListingValidationError> {
    if price <= 0 {
        return Err(ListingValidationError::InvalidPrice);
    }
    Ok(price)
}

fn check_year(year: i32) -> Result<i32, ListingValidationError> {
    let max = Utc::now().year();
    if year < MIN_LISTING_YEAR || year > max {
        return Err(ListingValidationError::InvalidYear { max });
    }
    Ok(year)
}

fn check_mileage(mileage: i64) -> Result<i64, ListingValidationError> {
    if mileage < 0 {
        return Err(ListingValidationError::InvalidMileage);
    }
    Ok(mileage)
}

fn normalise_description(description: Option<String>) -> Option<String> {
    description.filter(|text| !text.trim().is_empty())
}

/// Raw listing fields as they arrive at the boundary.
///
/// Kept as a parameter object so [`ListingDraft::new`] stays readable.
#[derive(Debug, Clone, Default)]
pub struct ListingFields {
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
    /// Raw category value.
    pub category: String,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// A fully validated listing submission, before persistence.
#[derive(Debug, Clone)]
pub struct ListingDraft {
    /// Listing headline name.
    pub name: String,
    /// Where the car is located.
    pub location: String,
    /// Asking price, strictly positive.
    pub price: i64,
    /// Model year within the accepted range.
    pub year: i32,
    /// Odometer reading, non-negative.
    pub mileage: i64,
    /// Fuel type.
    pub fuel: String,
    /// Transmission type.
    pub transmission: String,
    /// Browse category.
    pub category: CarCategory,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl ListingDraft {
    /// Validate every field of a submission.
    pub fn new(fields: ListingFields) -> Result<Self, ListingValidationError> {
        Ok(Self {
            name: require("name", fields.name)?,
            location: require("location", fields.location)?,
            price: check_price(fields.price)?,
            year: check_year(fields.year)?,
            mileage: check_mileage(fields.mileage)?,
            fuel: require("fuel", fields.fuel)?,
            transmission: require("transmission", fields.transmission)?,
            category: CarCategory::parse(&require("category", fields.category)?)?,
            make: require("make", fields.make)?,
            model: require("model", fields.model)?,
            description: normalise_description(fields.description),
        })
    }
}

/// A published car listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Repository-assigned identifier.
    pub id: ListingId,
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
    pub category: CarCategory,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Ordered image references; first entry is the primary image.
    pub images: Vec<AssetRef>,
    /// Whether the listing is promoted on the browse page.
    pub featured: bool,
    /// Owning seller.
    pub seller_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Build a new listing from a validated draft.
    pub fn from_draft(draft: ListingDraft, seller_id: UserId, images: Vec<AssetRef>) -> Self {
        Self {
            id: ListingId::random(),
            name: draft.name,
            location: draft.location,
            price: draft.price,
            year: draft.year,
            mileage: draft.mileage,
            fuel: draft.fuel,
            transmission: draft.transmission,
            category: draft.category,
            make: draft.make,
            model: draft.model,
            description: draft.description,
            images,
            featured: false,
            seller_id,
            created_at: Utc::now(),
        }
    }

    /// Whole days since the listing was created.
    pub fn days_posted(&self) -> i64 {
        (Utc::now() - self.created_at).num_days().max(0)
    }
}

/// Partial update to a listing; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
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
    pub category: Option<CarCategory>,
    /// Replacement make.
    pub make: Option<String>,
    /// Replacement model.
    pub model: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement featured flag.
    pub featured: Option<bool>,
}

impl ListingPatch {
    /// Re-validate every supplied field.
    pub fn validate(&self) -> Result<(), ListingValidationError> {
        if let Some(name) = &self.name {
            require("name", name.clone())?;
        }
        if let Some(location) = &self.location {
            require("location", location.clone())?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(year) = self.year {
            check_year(year)?;
        }
        if let Some(mileage) = self.mileage {
            check_mileage(mileage)?;
        }
        if let Some(fuel) = &self.fuel {
            require("fuel", fuel.clone())?;
        }
        if let Some(transmission) = &self.transmission {
            require("transmission", transmission.clone())?;
        }
        if let Some(make) = &self.make {
            require("make", make.clone())?;
        }
        if let Some(model) = &self.model {
            require("model", model.clone())?;
        }
        Ok(())
    }

    /// Whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Repository-facing update combining field changes and image replacement.
#[derive(Debug, Clone, Default)]
pub struct ListingChanges {
    /// Field-level changes.
    pub patch: ListingPatch,
    /// Replacement image set; `None` keeps the stored images.
    pub images: Option<Vec<AssetRef>>,
}

/// Browse filter predicates; all are conjunctive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    /// Case-insensitive substring match on the listing name.
    pub name_contains: Option<String>,
    /// Exact category match.
    pub category: Option<CarCategory>,
    /// Only featured listings.
    pub featured_only: bool,
    /// Inclusive lower price bound.
    pub price_min: Option<i64>,
    /// Inclusive upper price bound.
    pub price_max: Option<i64>,
}

/// Sort key for browse results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingSort {
    /// Cheapest first (the default).
    #[default]
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Oldest model year first.
    YearAsc,
    /// Newest model year first.
    YearDesc,
}

impl ListingSort {
    /// Parse a sort key from its query-string form.
    pub fn parse(raw: &str) -> Result<Self, ListingValidationError> {
        match raw {
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "year_asc" => Ok(Self::YearAsc),
            "year_desc" => Ok(Self::YearDesc),
            other => Err(ListingValidationError::UnknownSort {
                value: other.to_owned(),
            }),
        }
    }
}

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate a page request; both values must be positive.
    pub fn new(page: u32, page_size: u32) -> Result<Self, ListingValidationError> {
        if page == 0 || page_size == 0 {
            return Err(ListingValidationError::InvalidPage);
        }
        Ok(Self { page, page_size })
    }

    /// Requested page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Row offset for the repository query.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// Row limit for the repository query.
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// One page of results plus the match totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Items on this page, in sort order.
    pub items: Vec<T>,
    /// Total number of matches across all pages.
    pub total: u64,
    /// Total page count: `ceil(total / page_size)`.
    pub total_pages: u64,
    /// Echoed page number.
    pub page: u32,
    /// Echoed page size.
    pub page_size: u32,
}

impl<T> PageEnvelope<T> {
    /// Assemble an envelope from one page of items and the match total.
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            total_pages: total.div_ceil(u64::from(request.page_size())),
            page: request.page(),
            page_size: request.page_size(),
        }
    }
}

/// Listing count for one category, for the browse page tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// The category.
    pub category: CarCategory,
    /// Number of listings filed under it.
    pub count: u64,
}
