//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use crate::domain::account::UserId;
use crate::domain::ports::{
    FixtureAccountRepository, FixtureAssetStore, FixtureCarClassifier, FixtureCredentialHasher,
    FixtureListingRepository, FixtureTokenService, TokenService,
};
use crate::domain::{AccountService, ListingService, RecommendationService};

use super::state::HttpState;

/// Build an [`HttpState`] over fixture ports.
pub(crate) fn test_state() -> HttpState {
    let tokens: Arc<dyn TokenService> = Arc::new(FixtureTokenService);
    let accounts = Arc::new(AccountService::new(
        Arc::new(FixtureAccountRepository),
        Arc::new(FixtureListingRepository),
        Arc::new(FixtureAssetStore),
        Arc::new(FixtureCredentialHasher),
        Arc::clone(&tokens),
    ));
    let listings = Arc::new(ListingService::new(
        Arc::new(FixtureListingRepository),
        Arc::new(FixtureAssetStore),
        None,
    ));
    let recommender = Arc::new(RecommendationService::new(Arc::new(FixtureCarClassifier)));
    HttpState {
        accounts,
        listings,
        recommender,
        tokens,
    }
}

/// Authorization header value carrying a fixture token for `identity`.
pub(crate) fn token_for(identity: &UserId) -> String {
    let token = FixtureTokenService
        .issue(identity)
        .expect("fixture token issue cannot fail");
    format!("Bearer {token}")
}
