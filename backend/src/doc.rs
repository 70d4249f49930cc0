//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint plus the shared error schema.
//! Swagger UI serves the generated document in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::Error;
use crate::inbound::http::accounts::{AuthResponse, ProfileDto, ProfileResponse};
use crate::inbound::http::listings::{BrowsePage, CategoryCountDto, ListingDto};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "DriveWise backend API",
        description = "Marketplace backend for listing and browsing used cars.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::profile,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::change_password,
        crate::inbound::http::accounts::delete_account,
        crate::inbound::http::listings::create_listing,
        crate::inbound::http::listings::browse_listings,
        crate::inbound::http::listings::category_counts,
        crate::inbound::http::listings::get_listing,
        crate::inbound::http::listings::update_listing,
        crate::inbound::http::listings::delete_listing,
        crate::inbound::http::recommend::recommend,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ListingDto,
        BrowsePage,
        CategoryCountDto,
        ProfileDto,
        ProfileResponse,
        AuthResponse,
    )),
    tags(
        (name = "accounts", description = "Signup, login, and profile management"),
        (name = "listings", description = "Car listing lifecycle and browsing"),
        (name = "recommendations", description = "Price-based car name recommendation"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
