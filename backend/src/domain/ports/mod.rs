//! Domain ports: the trait boundary between the lifecycle services and the
//! infrastructure adapters that back them.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod asset_store;
mod car_classifier;
mod credential_hasher;
mod listing_repository;
mod token_service;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{
    AccountRepository, AccountRepositoryError, FixtureAccountRepository,
};
#[cfg(test)]
pub use asset_store::MockAssetStore;
pub use asset_store::{AssetStore, AssetStoreError, FixtureAssetStore};
#[cfg(test)]
pub use car_classifier::MockCarClassifier;
pub use car_classifier::{CarClassifier, CarClassifierError, FixtureCarClassifier};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher, FixtureCredentialHasher};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{
    FixtureListingRepository, ListingRepository, ListingRepositoryError,
};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{FixtureTokenService, TokenError, TokenService};
