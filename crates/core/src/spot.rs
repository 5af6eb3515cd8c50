//! Gold spot price lookup.
//!
//! The upstream feed quotes USD per troy ounce as a JSON array of objects with
//! a `price` field. The lookup converts the first quote to a per-gram price and
//! falls back to a fixed value whenever the feed cannot be used.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_SPOT_SOURCE_URL: &str = "https://api.metals.live/v1/spot/gold";

/// 31.1035 grams per troy ounce.
pub const GRAMS_PER_TROY_OUNCE: Decimal = Decimal::from_parts(311_035, 0, 0, false, 4);

/// 65.0 per gram.
pub const FALLBACK_GOLD_PRICE_PER_GRAM: Decimal = Decimal::from_parts(650, 0, 0, false, 1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("spot price request failed: {0}")]
    Transport(String),
    #[error("spot price source returned status {0}")]
    Status(u16),
    #[error("spot price payload could not be decoded: {0}")]
    Decode(String),
    #[error("spot price payload contained no quotes")]
    EmptyPayload,
    #[error("spot price must be positive, got {0}")]
    NonPositivePrice(Decimal),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
            Self::EmptyPayload => "empty_payload",
            Self::NonPositivePrice(_) => "non_positive_price",
        }
    }
}

/// Minimal HTTP GET capability the lookup needs from the host.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

#[async_trait]
pub trait GoldPriceSource: Send + Sync {
    /// Never fails; implementations absorb upstream errors.
    async fn current_price_per_gram(&self) -> Decimal;
}

#[derive(Debug, Deserialize)]
struct SpotQuote {
    price: Decimal,
}

pub struct SpotPriceLookup<F> {
    fetcher: F,
    source_url: String,
    fallback_per_gram: Decimal,
}

impl<F> SpotPriceLookup<F> {
    pub fn new(fetcher: F, source_url: impl Into<String>, fallback_per_gram: Decimal) -> Self {
        Self { fetcher, source_url: source_url.into(), fallback_per_gram }
    }

    pub fn with_defaults(fetcher: F) -> Self {
        Self::new(fetcher, DEFAULT_SPOT_SOURCE_URL, FALLBACK_GOLD_PRICE_PER_GRAM)
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn fallback_per_gram(&self) -> Decimal {
        self.fallback_per_gram
    }
}

impl<F: HttpFetcher> SpotPriceLookup<F> {
    pub async fn try_price_per_gram(&self) -> Result<Decimal, FetchError> {
        let response = self.fetcher.fetch(&self.source_url).await?;
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }
        parse_spot_payload(&response.body)
    }
}

#[async_trait]
impl<F: HttpFetcher> GoldPriceSource for SpotPriceLookup<F> {
    async fn current_price_per_gram(&self) -> Decimal {
        match self.try_price_per_gram().await {
            Ok(price) => {
                debug!(
                    event_name = "spot.lookup.succeeded",
                    source_url = %self.source_url,
                    price_per_gram = %price,
                    "gold spot price resolved"
                );
                price
            }
            Err(error) => {
                warn!(
                    event_name = "spot.lookup.fallback",
                    source_url = %self.source_url,
                    failure_kind = error.kind(),
                    error = %error,
                    fallback_per_gram = %self.fallback_per_gram,
                    "gold spot price unavailable, using fallback"
                );
                self.fallback_per_gram
            }
        }
    }
}

/// A source that always reports the same per-gram price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedGoldPrice(pub Decimal);

#[async_trait]
impl GoldPriceSource for FixedGoldPrice {
    async fn current_price_per_gram(&self) -> Decimal {
        self.0
    }
}

/// Converts the first troy-ounce quote in `body` to a per-gram price.
pub fn parse_spot_payload(body: &str) -> Result<Decimal, FetchError> {
    let quotes: Vec<SpotQuote> =
        serde_json::from_str(body).map_err(|error| FetchError::Decode(error.to_string()))?;
    let quote = quotes.first().ok_or(FetchError::EmptyPayload)?;

    if quote.price <= Decimal::ZERO {
        return Err(FetchError::NonPositivePrice(quote.price));
    }

    Ok(quote.price / GRAMS_PER_TROY_OUNCE)
}
