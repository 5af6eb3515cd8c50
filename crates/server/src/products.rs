//! Product catalog routes.
//!
//! - `GET /api/products`: every product priced at the current gold price
//! - `GET /api/products/filter`: same, narrowed by `minPrice`, `maxPrice`, `minPopularity`

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use gilded_core::{CatalogQueryService, PricedProduct, ProductFilter};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct ProductsState {
    service: Arc<CatalogQueryService>,
}

impl ProductsState {
    pub fn new(service: Arc<CatalogQueryService>) -> Self {
        Self { service }
    }
}

/// Raw query string values. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_popularity: Option<String>,
}

impl FilterQuery {
    pub fn into_filter(self) -> Result<ProductFilter, ApiError> {
        Ok(ProductFilter {
            min_price: parse_bound("minPrice", self.min_price)?,
            max_price: parse_bound("maxPrice", self.max_price)?,
            min_popularity: parse_bound("minPopularity", self.min_popularity)?,
        })
    }
}

fn parse_bound(name: &str, raw: Option<String>) -> Result<Option<Decimal>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Decimal::from_str(trimmed)
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("The value '{raw}' is not valid for {name}.")))
}

pub fn router(service: Arc<CatalogQueryService>) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/filter", get(filter_products))
        .with_state(ProductsState::new(service))
}

pub async fn list_products(State(state): State<ProductsState>) -> Json<Vec<PricedProduct>> {
    let correlation_id = Uuid::new_v4();
    let products = state.service.list_products().await;

    info!(
        event_name = "api.products.list",
        correlation_id = %correlation_id,
        product_count = products.len(),
        "products listed"
    );
    Json(products)
}

pub async fn filter_products(
    State(state): State<ProductsState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<PricedProduct>>, ApiError> {
    let correlation_id = Uuid::new_v4();
    let filter = query.into_filter().map_err(|error| {
        info!(
            event_name = "api.products.filter_rejected",
            correlation_id = %correlation_id,
            error = %error,
            "filter parameters rejected"
        );
        error
    })?;

    let products = state.service.list_filtered(&filter).await;

    info!(
        event_name = "api.products.filter",
        correlation_id = %correlation_id,
        product_count = products.len(),
        "products filtered"
    );
    Ok(Json(products))
}
