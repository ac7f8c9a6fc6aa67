//! Placement request description and the bids nodes answer with.

use serde::{Deserialize, Serialize};

use crate::core::common::NodeId;

/// Service level agreement of a function placement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sla {
    /// Memory to reserve, in MiB.
    pub mem: f64,
    /// Cores to reserve.
    pub core: f64,
    /// Max acceptable accumulated one-way network delay from the entry node, in ms.
    pub latency: f64,
    /// How long the resources stay reserved once granted, in ms.
    pub duration: f64,
}

impl Sla {
    pub fn new(mem: f64, core: f64, latency: f64, duration: f64) -> Self {
        Self {
            mem,
            core,
            latency,
            duration,
        }
    }

    /// Builds an SLA from workload units, where cpu is given in millicpu.
    pub fn from_millicpu(mem: f64, millicpu: f64, latency: f64, duration: f64) -> Self {
        Self::new(mem, millicpu / 1000.0, latency, duration)
    }
}

/// Price quote of one node for a given SLA.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bid {
    pub price: f64,
    pub bidder: String,
    /// Id of the bidder in the topology.
    pub node: NodeId,
    pub accumulated_latency: f64,
    /// Depth of the bidder in the topology, the root has level 0.
    pub level: usize,
}

impl Bid {
    pub fn new(
        price: f64,
        bidder: String,
        node: NodeId,
        accumulated_latency: f64,
        level: usize,
    ) -> Self {
        Self {
            price,
            bidder,
            node,
            accumulated_latency,
            level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sla;

    #[test]
    fn test_millicpu_converted_to_cores() {
        let sla = Sla::from_millicpu(100.0, 1500.0, 15.0, 5000.0);
        assert_eq!(sla.core, 1.5);
        assert_eq!(sla.mem, 100.0);
    }
}
