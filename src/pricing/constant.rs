//! Constant pricing: every bid has the same price regardless of the node load.

use serde::Deserialize;

use crate::core::error::ConfigurationError;
use crate::core::fog_node::FogNode;
use crate::core::sla::Sla;
use crate::pricing::interface::PricingStrategy;

#[derive(Debug, Deserialize)]
pub struct ConstantPricing {
    price: f64,
}

impl ConstantPricing {
    pub fn new(price: f64) -> Self {
        Self { price }
    }

    /// Make strategy from configuration string.
    /// Should be in the following form:
    /// ```
    /// use dslab_fog_market::pricing::constant::ConstantPricing;
    ///
    /// let strategy = ConstantPricing::from_str("price: 3.5").unwrap();
    /// assert_eq!(3.5, strategy.value());
    /// ```
    pub fn from_str(config: &str) -> Result<Self, ConfigurationError> {
        let strategy = serde_yaml::from_str::<ConstantPricing>(config)
            .map_err(|e| ConfigurationError::InvalidPricing(format!("constant: {}", e)))?;
        if !strategy.price.is_finite() || strategy.price < 0.0 {
            return Err(ConfigurationError::InvalidPricing(format!(
                "constant: price must be finite and non-negative, got {}",
                strategy.price
            )));
        }
        Ok(strategy)
    }

    pub fn value(&self) -> f64 {
        self.price
    }
}

impl PricingStrategy for ConstantPricing {
    fn name(&self) -> &str {
        "constant"
    }

    fn price(&self, _node: &FogNode, _sla: &Sla, _accumulated_latency: f64) -> f64 {
        self.price
    }
}
