//! Interface for pricing strategies which fog nodes use to quote their bids.

use serde::{Deserialize, Serialize};

use crate::core::fog_node::FogNode;
use crate::core::sla::{Bid, Sla};
use crate::pricing::latency::LatencyWeightingConfig;

/// Pricing strategy maps the current load of a node (and optionally the latency accumulated by
/// the placement request) to a price for serving the SLA.
pub trait PricingStrategy {
    fn name(&self) -> &str;

    fn price(&self, node: &FogNode, sla: &Sla, accumulated_latency: f64) -> f64;

    fn bid(&self, node: &FogNode, sla: &Sla, accumulated_latency: f64) -> Bid {
        Bid::new(
            self.price(node, sla, accumulated_latency),
            node.name.clone(),
            node.id,
            accumulated_latency,
            node.level,
        )
    }
}

/// Config describes model name and its parameters in form of yaml string which certain
/// implementation of `PricingStrategy` must be able to parse.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PricingConfig {
    pub model_name: String,
    #[serde(default)]
    pub config: String,
    /// Adds a surcharge depending on how far the bidder is from the entry node.
    #[serde(default)]
    pub latency_weighting: Option<LatencyWeightingConfig>,
    /// Price of a node at level `l` is multiplied by `tier_price_ratio ^ l`: values above 1 make
    /// the edge more expensive than the cloud, values below 1 make it cheaper.
    #[serde(default = "default_tier_price_ratio")]
    pub tier_price_ratio: f64,
}

fn default_tier_price_ratio() -> f64 {
    1.0
}

/// Utilization of the node cores before and after admitting the SLA.
pub fn utilization_interval(node: &FogNode, sla: &Sla) -> (f64, f64) {
    let before = node.cores_used / node.cores;
    let after = (node.cores_used + sla.core) / node.cores;
    (before, after)
}
