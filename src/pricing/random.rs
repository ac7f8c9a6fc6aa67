//! Random pricing: uniform price in [0, max_price], seeded per node.

use std::cell::RefCell;

use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::Deserialize;

use crate::core::error::ConfigurationError;
use crate::core::fog_node::FogNode;
use crate::core::sla::Sla;
use crate::pricing::interface::PricingStrategy;

#[derive(Debug, Deserialize)]
struct RandomPricingConfig {
    max_price: f64,
}

pub struct RandomPricing {
    max_price: f64,
    rng: RefCell<Pcg64>,
}

impl RandomPricing {
    pub fn new(max_price: f64, seed: u64) -> Self {
        Self {
            max_price,
            rng: RefCell::new(Pcg64::seed_from_u64(seed)),
        }
    }

    pub fn from_str(config: &str, seed: u64) -> Result<Self, ConfigurationError> {
        let parsed = serde_yaml::from_str::<RandomPricingConfig>(config)
            .map_err(|e| ConfigurationError::InvalidPricing(format!("random: {}", e)))?;
        if !parsed.max_price.is_finite() || parsed.max_price < 0.0 {
            return Err(ConfigurationError::InvalidPricing(format!(
                "random: max_price must be finite and non-negative, got {}",
                parsed.max_price
            )));
        }
        Ok(Self::new(parsed.max_price, seed))
    }
}

impl PricingStrategy for RandomPricing {
    fn name(&self) -> &str {
        "random"
    }

    fn price(&self, _node: &FogNode, _sla: &Sla, _accumulated_latency: f64) -> f64 {
        if self.max_price == 0.0 {
            return 0.0;
        }
        self.rng.borrow_mut().gen_range(0.0..=self.max_price)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::fog_node::FogNode;
    use crate::core::sla::Sla;
    use crate::pricing::constant::ConstantPricing;
    use crate::pricing::interface::PricingStrategy;
    use crate::pricing::random::RandomPricing;

    #[test]
    fn test_random_prices_are_bounded_and_reproducible() {
        let node = FogNode::new(
            0,
            "n".to_string(),
            0,
            None,
            4.0,
            1024.0,
            Box::new(ConstantPricing::new(0.0)),
        );
        let sla = Sla::new(10.0, 1.0, 10.0, 10.0);

        let first = RandomPricing::new(5.0, 7);
        let second = RandomPricing::new(5.0, 7);
        for _ in 0..100 {
            let price = first.price(&node, &sla, 0.0);
            assert!((0.0..=5.0).contains(&price));
            assert_eq!(price, second.price(&node, &sla, 0.0));
        }
    }

    #[test]
    fn test_invalid_max_price() {
        assert!(RandomPricing::from_str("max_price: -1.0", 0).is_err());
        assert!(RandomPricing::from_str("price: 1.0", 0).is_err());
    }
}
