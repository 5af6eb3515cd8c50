use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metal color variants every catalog product must carry an image for.
pub const REQUIRED_IMAGE_VARIANTS: [&str; 3] = ["yellow", "rose", "white"];

/// Variant name (`yellow`, `rose`, `white`) to image URL.
pub type ImageVariants = BTreeMap<String, String>;

/// A catalog entry. Loaded once at startup and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub popularity_score: Decimal,
    /// Gold weight in grams.
    pub weight: Decimal,
    pub images: ImageVariants,
}

impl Product {
    pub fn missing_image_variants(&self) -> Vec<&'static str> {
        REQUIRED_IMAGE_VARIANTS
            .into_iter()
            .filter(|variant| !self.images.contains_key(*variant))
            .collect()
    }
}

/// A product with its display price for a single gold price snapshot.
///
/// `price` and `gold_price_per_gram` carry scale 2 and `popularity_out_of_5`
/// carries scale 1, so they serialize as fixed-point strings (`"252.53"`).
/// The raw catalog attributes serialize as JSON numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedProduct {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub popularity_score: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
    pub images: ImageVariants,
    pub price: Decimal,
    #[serde(rename = "popularityOutOf5")]
    pub popularity_out_of_5: Decimal,
    #[serde(rename = "goldPrice")]
    pub gold_price_per_gram: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::domain::product::{ImageVariants, PricedProduct, Product};

    fn images(variants: &[&str]) -> ImageVariants {
        variants
            .iter()
            .map(|variant| (variant.to_string(), format!("https://cdn.example.com/{variant}.jpg")))
            .collect()
    }

    #[test]
    fn missing_image_variants_lists_absent_colors() {
        let product = Product {
            name: "Solitaire".to_string(),
            popularity_score: Decimal::new(50, 2),
            weight: Decimal::new(20, 1),
            images: images(&["yellow"]),
        };

        assert_eq!(product.missing_image_variants(), vec!["rose", "white"]);
    }

    #[test]
    fn priced_product_serializes_display_fields_as_strings() {
        let priced = PricedProduct {
            name: "Solitaire".to_string(),
            popularity_score: Decimal::new(85, 2),
            weight: Decimal::new(21, 1),
            images: images(&["yellow", "rose", "white"]),
            price: Decimal::new(25_253, 2),
            popularity_out_of_5: Decimal::new(43, 1),
            gold_price_per_gram: Decimal::new(6_500, 2),
        };

        let value = serde_json::to_value(&priced).expect("serialize");

        assert_eq!(value["name"], json!("Solitaire"));
        assert_eq!(value["popularityScore"], json!(0.85));
        assert_eq!(value["weight"], json!(2.1));
        assert_eq!(value["price"], json!("252.53"));
        assert_eq!(value["popularityOutOf5"], json!("4.3"));
        assert_eq!(value["goldPrice"], json!("65.00"));
        assert_eq!(value["images"]["rose"], json!("https://cdn.example.com/rose.jpg"));
    }
}
