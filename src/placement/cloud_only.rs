//! Cloud-only placement: the request is forwarded straight to the root, which is the only bidder.
//! The latency bound is not checked.

use crate::core::common::NodeId;
use crate::core::sla::Sla;
use crate::core::topology::Topology;
use crate::placement::interface::{PlacementStrategy, Visit};

pub struct CloudOnlyPlacement {}

impl PlacementStrategy for CloudOnlyPlacement {
    fn name(&self) -> &str {
        "cloud_only"
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
        if fog_node.is_root() {
            return Visit::answer(fog_node.bid(sla, accumulated_latency).into_iter().collect());
        }
        let root = topology.root();
        Visit::forward(vec![(
            root,
            accumulated_latency + topology.latency_between(node, root),
        )])
    }
}
