//! Shared HTTP adapter state.
//!
//! Handlers receive the lifecycle services through `actix_web::web::Data`,
//! so they stay free of infrastructure wiring and testable with fixture
//! ports.

use std::sync::Arc;

use crate::domain::ports::TokenService;
use crate::domain::{AccountService, ListingService, RecommendationService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account lifecycle service.
    pub accounts: Arc<AccountService>,
    /// Listing lifecycle service.
    pub listings: Arc<ListingService>,
    /// Recommendation service.
    pub recommender: Arc<RecommendationService>,
    /// Token service used by the auth extractor.
    pub tokens: Arc<dyn TokenService>,
}
