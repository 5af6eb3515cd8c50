use std::sync::Arc;

use axum::Router;
use gilded_core::config::{AppConfig, ConfigError, LoadOptions};
use gilded_core::{Catalog, CatalogError, CatalogQueryService, SpotPriceLookup};
use thiserror::Error;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

use crate::{error, fetcher::ReqwestFetcher, health, products};

pub struct Application {
    pub config: AppConfig,
    pub service: Arc<CatalogQueryService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl Application {
    pub fn router(&self) -> Router {
        router(self.service.clone())
    }
}

/// All routes, with handler panics mapped to 500 responses.
pub fn router(service: Arc<CatalogQueryService>) -> Router {
    Router::new()
        .merge(products::router(service.clone()))
        .merge(health::router(service))
        .layer(CatchPanicLayer::custom(error::panic_response))
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = match &config.catalog.path {
        Some(path) => Catalog::from_toml_file(path)?,
        None => Catalog::sample(),
    };
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        product_count = catalog.len(),
        source = config
            .catalog
            .path
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "catalog loaded"
    );

    let fetcher = ReqwestFetcher::with_timeout(config.gold_price.timeout())
        .map_err(BootstrapError::HttpClient)?;
    let gold_source = SpotPriceLookup::new(
        fetcher,
        config.gold_price.source_url.clone(),
        config.gold_price.fallback_per_gram,
    );
    info!(
        event_name = "system.bootstrap.spot_source_configured",
        correlation_id = "bootstrap",
        source_url = %config.gold_price.source_url,
        timeout_secs = config.gold_price.timeout_secs,
        fallback_per_gram = %config.gold_price.fallback_per_gram,
        "gold spot price source configured"
    );

    let service =
        Arc::new(CatalogQueryService::with_default_pricing(catalog, Arc::new(gold_source)));

    Ok(Application { config, service })
}
