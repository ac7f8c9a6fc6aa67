//! Flood placement: every node in the latency-feasible region is asked for a bid.

use crate::core::common::NodeId;
use crate::core::sla::{Bid, Sla};
use crate::core::topology::Topology;
use crate::placement::interface::{reachable_neighbors, PlacementStrategy, Visit};

/// Forwards the request to every reachable neighbor except the caller, so each node of the tree
/// is visited at most once.
pub fn flood_arrive(
    topology: &Topology,
    node: NodeId,
    caller: Option<NodeId>,
    sla: &Sla,
    accumulated_latency: f64,
) -> Visit {
    Visit::forward(reachable_neighbors(
        topology,
        node,
        caller,
        sla,
        accumulated_latency,
    ))
}

/// The node bids after its whole subtree has answered, with its state at that time.
pub fn flood_depart(
    topology: &Topology,
    node: NodeId,
    sla: &Sla,
    accumulated_latency: f64,
    collected: &mut Vec<Bid>,
) {
    collected.extend(topology.node(node).bid(sla, accumulated_latency));
}

pub struct AuctionPlacement {}

impl PlacementStrategy for AuctionPlacement {
    fn name(&self) -> &str {
        "auction"
    }

    fn arrive(
        &self,
        topology: &Topology,
        node: NodeId,
        caller: Option<NodeId>,
        sla: &Sla,
        accumulated_latency: f64,
    ) -> Visit {
        flood_arrive(topology, node, caller, sla, accumulated_latency)
    }

    fn depart(
        &self,
        topology: &Topology,
        node: NodeId,
        sla: &Sla,
        accumulated_latency: f64,
        collected: &mut Vec<Bid>,
    ) {
        flood_depart(topology, node, sla, accumulated_latency, collected);
    }
}
