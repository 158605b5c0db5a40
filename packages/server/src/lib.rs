#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for MLS property search.
//!
//! Serves the JSON API used by the listing browser: free-text and
//! filtered search, listing detail, price predictions, location
//! autocomplete, and data store status. The MLS CSV is loaded lazily by
//! the first request that needs it and shared by every worker.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use realty_map_geocoder::service_registry;
use realty_map_prediction::PredictionClient;
use realty_map_search::{PropertySearch, SearchConfig};
use realty_map_source::DataSourceConfig;

/// Shared application state.
pub struct AppState {
    /// Search over the cached MLS dataset.
    pub search: Arc<PropertySearch>,
    /// Price prediction service client.
    pub prediction: Arc<PredictionClient>,
}

impl AppState {
    /// Builds the state from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the geocoder or prediction HTTP clients cannot
    /// be built.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let data_source = DataSourceConfig::from_env();
        log::info!("MLS data source: {}", data_source.location);

        let geocoder = service_registry::default_geocoder()?;
        log::info!("Geocoding with {}", geocoder.base_url());

        let prediction = PredictionClient::from_env()?;
        log::info!("Price predictions from {}", prediction.endpoint());

        let search = PropertySearch::new(Arc::new(data_source.into_store()), Arc::new(geocoder))
            .with_config(SearchConfig::from_env());

        Ok(Self {
            search: Arc::new(search),
            prediction: Arc::new(prediction),
        })
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/search", web::get().to(handlers::search))
            .route("/properties", web::get().to(handlers::properties))
            .route("/properties/{id}", web::get().to(handlers::property))
            .route(
                "/properties/{id}/prediction",
                web::get().to(handlers::prediction),
            )
            .route("/suggestions", web::get().to(handlers::suggestions))
            .route("/status", web::get().to(handlers::status)),
    );
}

/// Starts the realty map API server.
///
/// Reads configuration from the environment (`BIND_ADDR`, `PORT`, and the
/// data source, geocoder and prediction settings) and runs the Actix-Web
/// HTTP server. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if configuration is invalid, or the
/// HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let state = web::Data::new(AppState::from_env().map_err(std::io::Error::other)?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
