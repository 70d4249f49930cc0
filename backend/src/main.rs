//! Backend entry-point: loads configuration, wires the adapters into the
//! lifecycle services, and starts the HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use drivewise_backend::ApiDoc;
use drivewise_backend::domain::ports::TokenService;
use drivewise_backend::domain::{
    AccountService, AssetRef, ListingService, RecommendationService,
};
use drivewise_backend::inbound::http::HttpState;
use drivewise_backend::inbound::http::health::{HealthState, live, ready};
use drivewise_backend::outbound::assets::FsAssetStore;
use drivewise_backend::outbound::classifier::HttpCarClassifier;
use drivewise_backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselListingRepository, run_migrations,
};
use drivewise_backend::outbound::security::{BcryptCredentialHasher, JwtTokenService};
use drivewise_backend::server::config::AppConfig;
use drivewise_backend::server::configure_api;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(init_error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %init_error, "tracing init failed");
    }

    let config = AppConfig::load_from_iter(std::env::args_os())
        .map_err(|config_error| std::io::Error::other(format!("configuration: {config_error}")))?;

    let database_url = config.database_url();
    run_migrations(&database_url).map_err(std::io::Error::other)?;
    let pool = DbPool::connect(&database_url, config.db_pool_size())
        .await
        .map_err(|pool_error| std::io::Error::other(pool_error.to_string()))?;

    let asset_store = Arc::new(FsAssetStore::open(config.asset_dir())?);
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
        &read_token_secret(&config)?,
        config.token_ttl(),
    ));

    let classifier_url = Url::parse(&config.classifier_url()).map_err(|parse_error| {
        std::io::Error::other(format!("invalid classifier url: {parse_error}"))
    })?;
    let classifier = HttpCarClassifier::new(classifier_url, config.classifier_timeout())
        .map_err(|client_error| std::io::Error::other(client_error.to_string()))?;

    let placeholder_image = config
        .placeholder_image
        .clone()
        .map(AssetRef::new)
        .transpose()
        .map_err(|reference_error| {
            std::io::Error::other(format!("invalid placeholder image: {reference_error}"))
        })?;

    let account_repository = Arc::new(DieselAccountRepository::new(pool.clone()));
    let listing_repository = Arc::new(DieselListingRepository::new(pool));
    let state = HttpState {
        accounts: Arc::new(AccountService::new(
            account_repository,
            listing_repository.clone(),
            asset_store.clone(),
            Arc::new(BcryptCredentialHasher::default()),
            Arc::clone(&tokens),
        )),
        listings: Arc::new(ListingService::new(
            listing_repository,
            asset_store,
            placeholder_image,
        )),
        recommender: Arc::new(RecommendationService::new(Arc::new(classifier))),
        tokens,
    };

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness flip stays visible here.
    let server_health_state = health_state.clone();
    let bind_addr = config.bind_addr();
    info!(addr = %bind_addr, "starting drivewise backend");

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(server_health_state.clone())
            .configure(|cfg| configure_api(cfg, state.clone()))
            .service(ready)
            .service(live);
        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
        app
    })
    .bind(bind_addr)?;

    health_state.mark_ready();
    server.run().await
}

/// Read the token signing secret, falling back to an ephemeral one only in
/// debug builds.
fn read_token_secret(config: &AppConfig) -> std::io::Result<Vec<u8>> {
    match config.token_secret_file.as_ref() {
        Some(path) => std::fs::read(path).map_err(|read_error| {
            std::io::Error::other(format!(
                "failed to read token secret at {}: {read_error}",
                path.display()
            ))
        }),
        None if cfg!(debug_assertions) => {
            warn!("no token secret configured; using an ephemeral secret (dev only)");
            Ok(uuid::Uuid::new_v4().as_bytes().to_vec())
        }
        None => Err(std::io::Error::other(
            "DRIVEWISE_TOKEN_SECRET_FILE must be set in release builds",
        )),
    }
}
