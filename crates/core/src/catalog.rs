use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::domain::product::{ImageVariants, PricedProduct, Product};
use crate::pricing::{DeterministicPricingEngine, PricingEngine};
use crate::spot::GoldPriceSource;

const SAMPLE_IMAGE_BASE_URL: &str = "https://cdn.shopify.com/s/files/1/0484/1429/4167/files";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("catalog validation failed: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The eight engagement rings shipped with the service.
    #[rustfmt::skip]
    pub fn sample() -> Self {
        Self::new(vec![
            ring("Engagement Ring 1", 85, 21, "EG085-100P", ["1696588368", "1696588406", "1696588402"]),
            ring("Engagement Ring 2", 51, 34, "EG012", ["1707727068", "1707727068", "1707727068"]),
            ring("Engagement Ring 3", 92, 38, "EG020-100P", ["1683534032", "1683534032", "1683534032"]),
            ring("Engagement Ring 4", 88, 45, "EG022-100P", ["1683532153", "1683532153", "1683532153"]),
            ring("Engagement Ring 5", 80, 25, "EG074-100P", ["1696232035", "1696927124", "1696927124"]),
            ring("Engagement Ring 6", 82, 18, "EG075-100P", ["1696591786", "1696591802", "1696591798"]),
            ring("Engagement Ring 7", 70, 52, "EG094-100P", ["1696589183", "1696589214", "1696589210"]),
            ring("Engagement Ring 8", 90, 37, "EG115-100P", ["1696596076", "1696596151", "1696596147"]),
        ])
    }

    /// Loads `[[products]]` entries from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        let file = toml::from_str::<CatalogFile>(&raw)
            .map_err(|source| CatalogError::ParseFile { path: path.to_path_buf(), source })?;

        let catalog = Self::new(file.products);
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.products.is_empty() {
            return Err(CatalogError::Validation(
                "catalog must contain at least one product".to_string(),
            ));
        }

        for (index, product) in self.products.iter().enumerate() {
            if product.name.trim().is_empty() {
                return Err(CatalogError::Validation(format!(
                    "products[{index}].name must not be empty"
                )));
            }
            if product.weight < Decimal::ZERO {
                return Err(CatalogError::Validation(format!(
                    "products[{index}].weight must not be negative (`{}`)",
                    product.name
                )));
            }
            let missing = product.missing_image_variants();
            if !missing.is_empty() {
                return Err(CatalogError::Validation(format!(
                    "products[{index}].images is missing {} (`{}`)",
                    missing.join(", "),
                    product.name
                )));
            }
        }

        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Builds a sample ring. `popularity` is in hundredths and `weight` in tenths of a gram.
/// `versions` are the CDN cache-buster values for the yellow, rose and white images.
fn ring(name: &str, popularity: i64, weight: i64, sku: &str, versions: [&str; 3]) -> Product {
    let images: ImageVariants = [("yellow", 'Y'), ("rose", 'R'), ("white", 'W')]
        .into_iter()
        .zip(versions)
        .map(|((variant, suffix), version)| {
            (variant.to_string(), format!("{SAMPLE_IMAGE_BASE_URL}/{sku}-{suffix}.jpg?v={version}"))
        })
        .collect();

    Product {
        name: name.to_string(),
        popularity_score: Decimal::new(popularity, 2),
        weight: Decimal::new(weight, 1),
        images,
    }
}

/// Optional bounds on the rounded display values, applied conjunctively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_popularity: Option<Decimal>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none() && self.max_price.is_none() && self.min_popularity.is_none()
    }

    pub fn apply(&self, mut products: Vec<PricedProduct>) -> Vec<PricedProduct> {
        if let Some(min_price) = self.min_price {
            products.retain(|product| product.price >= min_price);
        }
        if let Some(max_price) = self.max_price {
            products.retain(|product| product.price <= max_price);
        }
        if let Some(min_popularity) = self.min_popularity {
            products.retain(|product| product.popularity_out_of_5 >= min_popularity);
        }
        products
    }
}

pub struct CatalogQueryService<P = DeterministicPricingEngine> {
    catalog: Catalog,
    gold_source: Arc<dyn GoldPriceSource>,
    pricing_engine: P,
}

impl CatalogQueryService<DeterministicPricingEngine> {
    pub fn with_default_pricing(catalog: Catalog, gold_source: Arc<dyn GoldPriceSource>) -> Self {
        Self::new(catalog, gold_source, DeterministicPricingEngine)
    }
}

impl<P: PricingEngine> CatalogQueryService<P> {
    pub fn new(
        catalog: Catalog,
        gold_source: Arc<dyn GoldPriceSource>,
        pricing_engine: P,
    ) -> Self {
        Self { catalog, gold_source, pricing_engine }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Prices every product against one gold price snapshot, in catalog order.
    pub async fn list_products(&self) -> Vec<PricedProduct> {
        let gold_price_per_gram = self.gold_source.current_price_per_gram().await;
        self.price_all(gold_price_per_gram)
    }

    pub async fn list_filtered(&self, filter: &ProductFilter) -> Vec<PricedProduct> {
        let priced = self.list_products().await;
        let total = priced.len();
        let matched = filter.apply(priced);

        info!(
            event_name = "catalog.query.filtered",
            min_price = ?filter.min_price,
            max_price = ?filter.max_price,
            min_popularity = ?filter.min_popularity,
            total,
            matched = matched.len(),
            "catalog filter applied"
        );
        matched
    }

    fn price_all(&self, gold_price_per_gram: Decimal) -> Vec<PricedProduct> {
        self.catalog
            .products()
            .iter()
            .map(|product| self.pricing_engine.price(product, gold_price_per_gram))
            .collect()
    }
}
