//! Edge-ward placement: stay on the entry node if possible, otherwise climb towards the root.

use crate::core::common::NodeId;
use crate::core::sla::Sla;
use crate::core::topology::Topology;
use crate::placement::interface::{PlacementStrategy, Visit};

pub struct EdgeWardPlacement {}

impl PlacementStrategy for EdgeWardPlacement {
    fn name(&self) -> &str {
        "edge_ward"
    }

    fn arrive(
        &self,
        topology: &Topology,
        node: NodeId,
        _caller: Option<NodeId>,
        sla: &Sla,
        accumulated_latency: f64,
    ) -> Visit {
        let fog_node = topology.node(node);
        if let Some(bid) = fog_node.bid(sla, accumulated_latency) {
            return Visit::answer(vec![bid]);
        }
        let Some(parent) = fog_node.parent else {
            return Visit::default();
        };
        let arrival = accumulated_latency + topology.latency_between(node, parent);
        if arrival > sla.latency {
            return Visit::default();
        }
        Visit::forward(vec![(parent, arrival)])
    }
}
