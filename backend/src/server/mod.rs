//! Server wiring: route registration shared by `main` and the tests.

pub mod config;

use actix_web::web;

use crate::inbound::http::{HttpState, accounts, listings, recommend};

/// Register the versioned API scope on an actix app.
///
/// The `categories` route must precede the `{id}` route so the literal
/// segment wins.
pub fn configure_api(cfg: &mut web::ServiceConfig, state: HttpState) {
    cfg.app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .service(accounts::signup)
            .service(accounts::login)
            .service(accounts::profile)
            .service(accounts::update_profile)
            .service(accounts::change_password)
            .service(accounts::delete_account)
            .service(listings::create_listing)
            .service(listings::browse_listings)
            .service(listings::category_counts)
            .service(listings::get_listing)
            .service(listings::update_listing)
            .service(listings::delete_listing)
            .service(recommend::recommend),
    );
}
