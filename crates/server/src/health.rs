use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use gilded_core::CatalogQueryService;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    service: Arc<CatalogQueryService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(service: Arc<CatalogQueryService>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { service })
}

/// Readiness only; the spot price feed is not probed since lookups never fail.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state.service);
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "gilded-server runtime initialized".to_string(),
        },
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(service: &CatalogQueryService) -> HealthCheck {
    match service.catalog().len() {
        0 => HealthCheck { status: "degraded", detail: "catalog has no products".to_string() },
        count => HealthCheck { status: "ready", detail: format!("{count} products loaded") },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use gilded_core::{Catalog, CatalogQueryService, FixedGoldPrice};
    use rust_decimal::Decimal;

    use crate::health::{health, HealthState};

    fn state(catalog: Catalog) -> State<HealthState> {
        State(HealthState {
            service: Arc::new(CatalogQueryService::with_default_pricing(
                catalog,
                Arc::new(FixedGoldPrice(Decimal::from(65))),
            )),
        })
    }

    #[tokio::test]
    async fn health_returns_ready_with_sample_catalog() {
        let (status, Json(payload)) = health(state(Catalog::sample())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.detail, "8 products loaded");
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_for_empty_catalog() {
        let (status, Json(payload)) = health(state(Catalog::default())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.catalog.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
