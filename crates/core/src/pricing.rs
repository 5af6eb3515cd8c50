use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::product::{PricedProduct, Product};

pub const PRICE_SCALE: u32 = 2;
pub const POPULARITY_SCALE: u32 = 1;

const POPULARITY_RATING_MAX: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

pub trait PricingEngine: Send + Sync {
    fn price(&self, product: &Product, gold_price_per_gram: Decimal) -> PricedProduct;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, product: &Product, gold_price_per_gram: Decimal) -> PricedProduct {
        price_product(product, gold_price_per_gram)
    }
}

/// `(popularity + 1) * weight * gold`, rounded half away from zero for display.
///
/// Out-of-range popularity scores are not rejected; they flow through the
/// arithmetic unchanged.
pub fn price_product(product: &Product, gold_price_per_gram: Decimal) -> PricedProduct {
    let multiplier = product.popularity_score + Decimal::ONE;
    let raw_price = multiplier * product.weight * gold_price_per_gram;
    let raw_rating = product.popularity_score * POPULARITY_RATING_MAX;

    PricedProduct {
        name: product.name.clone(),
        popularity_score: product.popularity_score,
        weight: product.weight,
        images: product.images.clone(),
        price: round_for_display(raw_price, PRICE_SCALE),
        popularity_out_of_5: round_for_display(raw_rating, POPULARITY_SCALE),
        gold_price_per_gram: round_for_display(gold_price_per_gram, PRICE_SCALE),
    }
}

/// Rounds to `scale` places and pads to exactly that many, so `549.9` becomes `549.90`.
pub fn round_for_display(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::{Decimal, RoundingStrategy};

    use crate::{
        catalog::Catalog,
        domain::product::Product,
        pricing::{
            price_product, round_for_display, DeterministicPricingEngine, PricingEngine,
            POPULARITY_SCALE, PRICE_SCALE,
        },
    };

    fn product(popularity_score: Decimal, weight: Decimal) -> Product {
        Product {
            name: "Test Ring".to_string(),
            popularity_score,
            weight,
            images: BTreeMap::new(),
        }
    }

    #[test]
    fn price_rounds_midpoint_away_from_zero() {
        let ring = product(Decimal::new(85, 2), Decimal::new(21, 1));
        let priced = price_product(&ring, Decimal::new(650, 1));

        // 1.85 * 2.1 * 65.0 = 252.525
        assert_eq!(priced.price.to_string(), "252.53");
        assert_eq!(priced.popularity_out_of_5.to_string(), "4.3");
        assert_eq!(priced.gold_price_per_gram.to_string(), "65.00");
    }

    #[test]
    fn display_values_are_padded_to_fixed_scale() {
        let ring = product(Decimal::new(88, 2), Decimal::new(45, 1));
        let priced = price_product(&ring, Decimal::new(65, 0));

        assert_eq!(priced.price.to_string(), "549.90");
        assert_eq!(priced.price.scale(), PRICE_SCALE);
        assert_eq!(priced.popularity_out_of_5.to_string(), "4.4");
        assert_eq!(priced.popularity_out_of_5.scale(), POPULARITY_SCALE);
    }

    #[test]
    fn price_matches_formula_for_every_sample_product() {
        let gold_prices = [
            Decimal::ZERO,
            Decimal::new(650, 1),
            Decimal::new(643_014, 4),
            Decimal::new(12_345, 1),
        ];

        for product in Catalog::sample().products() {
            for gold in gold_prices {
                let priced = price_product(product, gold);
                let expected = ((product.popularity_score + Decimal::ONE) * product.weight * gold)
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                assert_eq!(priced.price, expected, "{} at {gold}", product.name);

                let rating = product.popularity_score * Decimal::from(5);
                assert_eq!(priced.popularity_out_of_5, round_for_display(rating, 1));
                assert!(priced.popularity_out_of_5 >= Decimal::ZERO);
                assert!(priced.popularity_out_of_5 <= Decimal::from(5));
            }
        }
    }

    #[test]
    fn out_of_range_popularity_propagates_without_error() {
        let ring = product(Decimal::new(15, 1), Decimal::ONE);
        let priced = price_product(&ring, Decimal::from(10));

        assert_eq!(priced.price.to_string(), "25.00");
        assert_eq!(priced.popularity_out_of_5.to_string(), "7.5");
    }

    #[test]
    fn zero_weight_prices_at_zero() {
        let ring = product(Decimal::new(90, 2), Decimal::ZERO);
        let priced = price_product(&ring, Decimal::from(65));

        assert_eq!(priced.price.to_string(), "0.00");
    }

    #[test]
    fn engine_trait_delegates_to_price_product() {
        let item = product(Decimal::new(70, 2), Decimal::new(52, 1));
        let gold = Decimal::new(650, 1);

        assert_eq!(DeterministicPricingEngine.price(&item, gold), price_product(&item, gold));
    }
}
