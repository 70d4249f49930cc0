//! Domain layer: entities, validated value types, lifecycle services, and
//! the ports that keep infrastructure behind a trait boundary.

pub mod account;
pub mod account_service;
pub mod asset;
pub mod error;
pub mod listing;
pub mod listing_service;
pub mod ports;
pub mod recommendation;

pub use account::{
    AccountValidationError, ContactNumber, EmailAddress, FullName, Password, ProfileChanges,
    UserAccount, UserId,
};
pub use account_service::{
    AccountService, AuthenticatedAccount, CHANGE_PASSWORD_MIN, ProfileUpdate, SIGNUP_PASSWORD_MIN,
    SignupRequest,
};
pub use asset::{
    ALLOWED_IMAGE_EXTENSIONS, AssetRef, AssetValidationError, ImageUpload, MAX_IMAGE_BYTES,
};
pub use error::{Error, ErrorCode};
pub use listing::{
    CarCategory, CategoryCount, Listing, ListingChanges, ListingDraft, ListingFields,
    ListingFilter, ListingId, ListingPatch, ListingSort, ListingValidationError, PageEnvelope,
    PageRequest,
};
pub use listing_service::ListingService;
pub use recommendation::{CarFeatures, RecommendationService, UnknownFeatureValue};
