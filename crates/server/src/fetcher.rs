use std::time::Duration;

use async_trait::async_trait;
use gilded_core::spot::{FetchError, HttpFetcher, HttpResponse};
use reqwest::Client;

/// reqwest-backed [`HttpFetcher`] with a per-request timeout.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::Transport(error.to_string()))?;

        let status = response.status().as_u16();
        let body =
            response.text().await.map_err(|error| FetchError::Transport(error.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{http::StatusCode, routing::get, Router};
    use gilded_core::spot::{
        FetchError, GoldPriceSource, HttpFetcher, SpotPriceLookup, FALLBACK_GOLD_PRICE_PER_GRAM,
    };
    use reqwest::Client;
    use rust_decimal::Decimal;

    use crate::fetcher::ReqwestFetcher;

    async fn spawn_spot_feed() -> String {
        let router = Router::new()
            .route("/v1/spot/gold", get(|| async { r#"[{"price": 3110.35}]"# }))
            .route("/v1/spot/empty", get(|| async { "[]" }))
            .route(
                "/v1/spot/down",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route(
                "/v1/spot/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    r#"[{"price": 3110.35}]"#
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub feed");
        let address = listener.local_addr().expect("stub feed address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        format!("http://{address}")
    }

    fn fetcher_with_timeout(timeout: Duration) -> ReqwestFetcher {
        let client =
            Client::builder().no_proxy().timeout(timeout).build().expect("client should build");
        ReqwestFetcher::from_client(client)
    }

    fn fetcher() -> ReqwestFetcher {
        fetcher_with_timeout(Duration::from_secs(2))
    }

    #[tokio::test]
    async fn fetch_returns_status_and_body() {
        let base = spawn_spot_feed().await;

        let response = fetcher().fetch(&format!("{base}/v1/spot/down")).await.expect("fetch");

        assert_eq!(response.status, 503);
        assert_eq!(response.body, "maintenance");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn live_feed_is_converted_to_per_gram_price() {
        let base = spawn_spot_feed().await;
        let lookup = SpotPriceLookup::new(
            fetcher(),
            format!("{base}/v1/spot/gold"),
            FALLBACK_GOLD_PRICE_PER_GRAM,
        );

        assert_eq!(lookup.current_price_per_gram().await, Decimal::from(100));
    }

    #[tokio::test]
    async fn failing_feeds_fall_back_to_constant() {
        let base = spawn_spot_feed().await;

        for path in ["/v1/spot/empty", "/v1/spot/down", "/v1/spot/missing"] {
            let url = format!("{base}{path}");
            let lookup = SpotPriceLookup::new(fetcher(), url, FALLBACK_GOLD_PRICE_PER_GRAM);
            assert_eq!(
                lookup.current_price_per_gram().await,
                Decimal::new(6_500, 2),
                "{path} should fall back"
            );
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("address");
        drop(listener);

        let result = fetcher().fetch(&format!("http://{address}/v1/spot/gold")).await;

        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn slow_feed_times_out_and_falls_back() {
        let base = spawn_spot_feed().await;
        let lookup = SpotPriceLookup::new(
            fetcher_with_timeout(Duration::from_millis(200)),
            format!("{base}/v1/spot/slow"),
            FALLBACK_GOLD_PRICE_PER_GRAM,
        );

        assert!(matches!(lookup.try_price_per_gram().await, Err(FetchError::Transport(_))));
        assert_eq!(lookup.current_price_per_gram().await, FALLBACK_GOLD_PRICE_PER_GRAM);
    }
}
