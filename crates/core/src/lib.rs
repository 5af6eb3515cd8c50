pub mod catalog;
pub mod config;
pub mod domain;
pub mod pricing;
pub mod spot;

pub use catalog::{Catalog, CatalogError, CatalogQueryService, ProductFilter};
pub use domain::product::{ImageVariants, PricedProduct, Product};
pub use pricing::{price_product, DeterministicPricingEngine, PricingEngine};
pub use spot::{
    FetchError, FixedGoldPrice, GoldPriceSource, HttpFetcher, HttpResponse, SpotPriceLookup,
};
