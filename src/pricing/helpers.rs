//! Helpers for default pricing and builder from configuration

use crate::core::common::NodeId;
use crate::core::error::ConfigurationError;
use crate::core::fog_node::FogNode;
use crate::core::sla::Sla;
use crate::pricing::constant::ConstantPricing;
use crate::pricing::interface::{PricingConfig, PricingStrategy};
use crate::pricing::latency::LatencyWeightedPricing;
use crate::pricing::random::RandomPricing;
use crate::pricing::utilization::UtilizationPricing;

/// Default pricing is linear marginal cost.
pub fn default_pricing_config() -> PricingConfig {
    PricingConfig {
        model_name: "linear".to_string(),
        config: "initial_price: 1.0\nslope: 1.0".to_string(),
        latency_weighting: None,
        tier_price_ratio: 1.0,
    }
}

/// Multiplies the quotes of a tier by a constant factor.
struct TierScaledPricing {
    inner: Box<dyn PricingStrategy>,
    factor: f64,
}

impl PricingStrategy for TierScaledPricing {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn price(&self, node: &FogNode, sla: &Sla, accumulated_latency: f64) -> f64 {
        self.factor * self.inner.price(node, sla, accumulated_latency)
    }
}

/// Builds the pricing strategy of a node at depth `level`. Random models are seeded with
/// `seed + node_id` so every node draws its own reproducible sequence.
pub fn pricing_strategy_from_config(
    config: &PricingConfig,
    level: usize,
    node_id: NodeId,
    seed: u64,
) -> Result<Box<dyn PricingStrategy>, ConfigurationError> {
    let mut strategy: Box<dyn PricingStrategy> = match &config.model_name as &str {
        "constant" => Box::new(ConstantPricing::from_str(&config.config)?),
        "random" => Box::new(RandomPricing::from_str(
            &config.config,
            seed.wrapping_add(node_id as u64),
        )?),
        "linear" => Box::new(UtilizationPricing::linear_from_str(&config.config)?),
        "piecewise_linear" => Box::new(UtilizationPricing::piecewise_linear_from_str(
            &config.config,
        )?),
        "logistic" => Box::new(UtilizationPricing::logistic_from_str(&config.config)?),
        _ => {
            return Err(ConfigurationError::InvalidPricing(format!(
                "unsupported pricing model {:?}",
                config.model_name
            )))
        }
    };

    if let Some(weighting) = &config.latency_weighting {
        weighting.validate()?;
        strategy = Box::new(LatencyWeightedPricing::new(strategy, weighting.clone()));
    }

    if !config.tier_price_ratio.is_finite() || config.tier_price_ratio <= 0.0 {
        return Err(ConfigurationError::InvalidPricing(format!(
            "tier_price_ratio must be strictly positive, got {}",
            config.tier_price_ratio
        )));
    }
    let factor = config.tier_price_ratio.powi(level as i32);
    if factor != 1.0 {
        strategy = Box::new(TierScaledPricing {
            inner: strategy,
            factor,
        });
    }
    Ok(strategy)
}
