//! Latency surcharge on top of another pricing strategy.
//!
//! The surcharge is the integral of `initial_price + slope * r` over `[0, r]` where
//! `r = accumulated_latency / sla.latency` is the share of the latency budget already spent
//! when the request reaches the bidder.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigurationError;
use crate::core::fog_node::FogNode;
use crate::core::sla::Sla;
use crate::pricing::interface::{utilization_interval, PricingStrategy};

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum LatencyWeightingMode {
    /// `base * (1 + surcharge)`
    Multiplicative,
    /// `base + surcharge`
    Additive,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LatencyWeightingConfig {
    pub mode: LatencyWeightingMode,
    pub initial_price: f64,
    pub slope: f64,
}

impl LatencyWeightingConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (field, value) in [("initial_price", self.initial_price), ("slope", self.slope)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidPricing(format!(
                    "latency weighting: {} must be finite and non-negative, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }

    pub fn surcharge(&self, accumulated_latency: f64, sla_latency: f64) -> f64 {
        if sla_latency <= 0.0 {
            return 0.0;
        }
        let ratio = accumulated_latency / sla_latency;
        self.initial_price * ratio + self.slope * ratio * ratio / 2.0
    }
}

pub struct LatencyWeightedPricing {
    name: String,
    base: Box<dyn PricingStrategy>,
    weighting: LatencyWeightingConfig,
}

impl LatencyWeightedPricing {
    pub fn new(base: Box<dyn PricingStrategy>, weighting: LatencyWeightingConfig) -> Self {
        let suffix = match weighting.mode {
            LatencyWeightingMode::Multiplicative => "latency_mul",
            LatencyWeightingMode::Additive => "latency_add",
        };
        Self {
            name: format!("{}_{}", base.name(), suffix),
            base,
            weighting,
        }
    }
}

impl PricingStrategy for LatencyWeightedPricing {
    fn name(&self) -> &str {
        &self.name
    }

    fn price(&self, node: &FogNode, sla: &Sla, accumulated_latency: f64) -> f64 {
        let (before, after) = utilization_interval(node, sla);
        if before == after {
            return 0.0;
        }
        let base = self.base.price(node, sla, accumulated_latency);
        let surcharge = self.weighting.surcharge(accumulated_latency, sla.latency);
        match self.weighting.mode {
            LatencyWeightingMode::Multiplicative => base * (1.0 + surcharge),
            LatencyWeightingMode::Additive => base + surcharge,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::fog_node::FogNode;
    use crate::core::sla::Sla;
    use crate::pricing::constant::ConstantPricing;
    use crate::pricing::interface::PricingStrategy;
    use crate::pricing::latency::{
        LatencyWeightedPricing, LatencyWeightingConfig, LatencyWeightingMode,
    };

    fn node() -> FogNode {
        FogNode::new(
            0,
            "node".to_string(),
            0,
            None,
            4.0,
            1024.0,
            Box::new(ConstantPricing::new(0.0)),
        )
    }

    fn weighted(mode: LatencyWeightingMode) -> LatencyWeightedPricing {
        LatencyWeightedPricing::new(
            Box::new(ConstantPricing::new(10.0)),
            LatencyWeightingConfig {
                mode,
                initial_price: 1.0,
                slope: 2.0,
            },
        )
    }

    #[test]
    fn test_surcharge_grows_with_latency() {
        let sla = Sla::new(64.0, 1.0, 20.0, 100.0);
        let node = node();

        let additive = weighted(LatencyWeightingMode::Additive);
        assert_eq!(additive.price(&node, &sla, 0.0), 10.0);
        // r = 0.5: 0.5 + 2 * 0.25 / 2 = 0.75
        assert_eq!(additive.price(&node, &sla, 10.0), 10.75);
        assert_eq!(additive.name(), "constant_latency_add");

        let multiplicative = weighted(LatencyWeightingMode::Multiplicative);
        assert_eq!(multiplicative.price(&node, &sla, 10.0), 17.5);
        assert!(multiplicative.price(&node, &sla, 20.0) > multiplicative.price(&node, &sla, 10.0));
    }

    #[test]
    fn test_no_surcharge_for_zero_cores() {
        let sla = Sla::new(64.0, 0.0, 20.0, 100.0);
        let node = node();
        assert_eq!(weighted(LatencyWeightingMode::Additive).price(&node, &sla, 10.0), 0.0);
        assert_eq!(weighted(LatencyWeightingMode::Multiplicative).price(&node, &sla, 10.0), 0.0);
    }

    #[test]
    fn test_zero_latency_budget_has_no_surcharge() {
        let sla = Sla::new(64.0, 1.0, 0.0, 100.0);
        let pricing = weighted(LatencyWeightingMode::Multiplicative);
        assert_eq!(pricing.price(&node(), &sla, 0.0), 10.0);
    }
}
