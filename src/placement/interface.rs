//! Interface for placement strategies which route a placement request through the topology.
//!
//! A request travels hop by hop. On every node it reaches, the strategy gives the bids made on
//! arrival and the branches (neighbors with the accumulated latency at their arrival) to ask
//! next. Branches are asked one after another: the next one only after the previous has answered.
//! When the last branch has answered, the node may add bids made on departure and its collected
//! bids go back to the caller.

use crate::core::common::NodeId;
use crate::core::sla::{Bid, Sla};
use crate::core::topology::Topology;

/// Result of the winner selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionOutcome {
    pub winner: Bid,
    /// Price the winner is paid.
    pub price: f64,
}

/// What a node does with a request that has just reached it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Visit {
    pub bids: Vec<Bid>,
    /// Neighbors to forward the request to, in the order they are asked.
    pub branches: Vec<(NodeId, f64)>,
}

impl Visit {
    pub fn answer(bids: Vec<Bid>) -> Self {
        Self {
            bids,
            branches: vec![],
        }
    }

    pub fn forward(branches: Vec<(NodeId, f64)>) -> Self {
        Self {
            bids: vec![],
            branches,
        }
    }
}

/// Trait which should implement any placement strategy of the marketplace.
pub trait PlacementStrategy {
    fn name(&self) -> &str;

    /// Handles a placement request which arrived at `node` from `caller` (None when the request
    /// enters the topology at `node`) after travelling `accumulated_latency` ms.
    fn arrive(
        &self,
        topology: &Topology,
        node: NodeId,
        caller: Option<NodeId>,
        sla: &Sla,
        accumulated_latency: f64,
    ) -> Visit;

    /// Returns false if the branch arriving at `next_arrival` is not worth asking given the bids
    /// collected on this node so far. Later branches are skipped too.
    fn continue_after(&self, _collected: &[Bid], _next_arrival: f64) -> bool {
        true
    }

    /// Adds the answer of a branch to the bids collected on this node.
    fn merge(&self, collected: &mut Vec<Bid>, answer: Vec<Bid>) {
        collected.extend(answer);
    }

    /// Runs once every branch of `node` has answered, right before answering the caller.
    fn depart(
        &self,
        _topology: &Topology,
        _node: NodeId,
        _sla: &Sla,
        _accumulated_latency: f64,
        _collected: &mut Vec<Bid>,
    ) {
    }

    /// Explores the topology without spending simulated time, every node sees the current
    /// state. Returns the bids collected in the explored region.
    fn place(
        &self,
        topology: &Topology,
        node: NodeId,
        caller: Option<NodeId>,
        sla: &Sla,
        accumulated_latency: f64,
    ) -> Vec<Bid> {
        let visit = self.arrive(topology, node, caller, sla, accumulated_latency);
        let mut collected = visit.bids;
        for (neighbor, arrival) in visit.branches {
            if !self.continue_after(&collected, arrival) {
                break;
            }
            let answer = self.place(topology, neighbor, Some(node), sla, arrival);
            self.merge(&mut collected, answer);
        }
        self.depart(topology, node, sla, accumulated_latency, &mut collected);
        collected
    }

    /// Picks the winner among the collected bids. Second-price auction by default.
    fn select_winner(&self, bids: Vec<Bid>) -> Option<AuctionOutcome> {
        second_price_auction(bids)
    }
}

/// Orders bids by ascending price, equal prices by bidder name.
pub fn sort_bids_by_price(bids: &mut [Bid]) {
    bids.sort_by(|a, b| {
        a.price
            .total_cmp(&b.price)
            .then_with(|| a.bidder.cmp(&b.bidder))
    });
}

/// The cheapest bid wins and is paid the price of the second cheapest one, or its own price when
/// it is the only bid.
pub fn second_price_auction(mut bids: Vec<Bid>) -> Option<AuctionOutcome> {
    sort_bids_by_price(&mut bids);
    let price = match bids.get(1) {
        Some(second) => second.price,
        None => bids.first()?.price,
    };
    let winner = bids.into_iter().next()?;
    Some(AuctionOutcome { winner, price })
}

/// Neighbors of `node` except `caller` which the request can reach without exceeding the latency
/// bound, with the accumulated latency at arrival. Children come first, then the parent.
pub fn reachable_neighbors(
    topology: &Topology,
    node: NodeId,
    caller: Option<NodeId>,
    sla: &Sla,
    accumulated_latency: f64,
) -> Vec<(NodeId, f64)> {
    topology
        .neighbors(node)
        .into_iter()
        .filter(|(neighbor, _)| Some(*neighbor) != caller)
        .map(|(neighbor, latency)| (neighbor, accumulated_latency + latency))
        .filter(|(_, arrival)| *arrival <= sla.latency)
        .collect()
}
