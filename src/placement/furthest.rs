//! Furthest placement: bids are collected like the flood auction, but the deepest bidder wins.

use crate::core::common::NodeId;
use crate::core::sla::{Bid, Sla};
use crate::core::topology::Topology;
use crate::placement::auction::{flood_arrive, flood_depart};
use crate::placement::interface::{AuctionOutcome, PlacementStrategy, Visit};

pub struct FurthestPlacement {}

impl PlacementStrategy for FurthestPlacement {
    fn name(&self) -> &str {
        "furthest"
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

    /// Deepest level wins, then the cheaper bid, then the bidder name. The winner is paid its own
    /// price.
    fn select_winner(&self, bids: Vec<Bid>) -> Option<AuctionOutcome> {
        let winner = bids.into_iter().min_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then_with(|| a.price.total_cmp(&b.price))
                .then_with(|| a.bidder.cmp(&b.bidder))
        })?;
        Some(AuctionOutcome {
            price: winner.price,
            winner,
        })
    }
}
