//! Fog node state: capacity, usage counters and currently held commitments.

use serde::Serialize;

use crate::core::common::{FunctionId, NodeId};
use crate::core::sla::{Bid, Sla};
use crate::pricing::interface::PricingStrategy;

/// Commitment currently holding resources of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionedFunction {
    pub function_id: FunctionId,
    pub sla: Sla,
    pub price: f64,
    pub start_time: f64,
}

pub struct FogNode {
    pub id: NodeId,
    pub name: String,
    /// Depth in the topology, the root (market) node has level 0.
    pub level: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,

    // Usable capacity
    pub cores: f64,
    pub mem: f64, // in MiB

    pub cores_used: f64,
    pub mem_used: f64,

    pub provisioned: Vec<ProvisionedFunction>,
    pub pricing_strategy: Box<dyn PricingStrategy>,
}

impl FogNode {
    pub fn new(
        id: NodeId,
        name: String,
        level: usize,
        parent: Option<NodeId>,
        cores: f64,
        mem: f64,
        pricing_strategy: Box<dyn PricingStrategy>,
    ) -> Self {
        Self {
            id,
            name,
            level,
            parent,
            children: Default::default(),
            cores,
            mem,
            cores_used: 0.0,
            mem_used: 0.0,
            provisioned: Default::default(),
            pricing_strategy,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns true if the node has enough free cores and memory to hold the SLA right now.
    pub fn is_feasible(&self, sla: &Sla) -> bool {
        self.cores_used + sla.core <= self.cores && self.mem_used + sla.mem <= self.mem
    }

    pub fn free_cores(&self) -> f64 {
        self.cores - self.cores_used
    }

    /// Asks the pricing strategy of the node for a quote. Returns None when the node cannot
    /// hold the SLA.
    pub fn bid(&self, sla: &Sla, accumulated_latency: f64) -> Option<Bid> {
        if !self.is_feasible(sla) {
            return None;
        }
        Some(self.pricing_strategy.bid(self, sla, accumulated_latency))
    }

    /// Reserves resources for the function. Feasibility is checked again because usage may have
    /// changed since the bid was made.
    pub fn provision(
        &mut self,
        function_id: FunctionId,
        sla: &Sla,
        price: f64,
        start_time: f64,
    ) -> bool {
        if !self.is_feasible(sla) {
            return false;
        }
        self.cores_used += sla.core;
        self.mem_used += sla.mem;
        self.provisioned.push(ProvisionedFunction {
            function_id,
            sla: sla.clone(),
            price,
            start_time,
        });
        true
    }

    /// Gives back resources held by the function. Returns None if the function is not held here.
    pub fn release(&mut self, function_id: FunctionId) -> Option<ProvisionedFunction> {
        let idx = self
            .provisioned
            .iter()
            .position(|f| f.function_id == function_id)?;
        let released = self.provisioned.remove(idx);
        self.cores_used = (self.cores_used - released.sla.core).max(0.0);
        self.mem_used = (self.mem_used - released.sla.mem).max(0.0);
        if self.provisioned.is_empty() {
            // drop float residue once nothing is held
            self.cores_used = 0.0;
            self.mem_used = 0.0;
        }
        Some(released)
    }
}

impl std::fmt::Debug for FogNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FogNode")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("cores", &self.cores)
            .field("mem", &self.mem)
            .field("cores_used", &self.cores_used)
            .field("mem_used", &self.mem_used)
            .field("pricing_strategy", &self.pricing_strategy.name())
            .finish()
    }
}
