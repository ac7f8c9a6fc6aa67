//! Marketplace component runs an auction for every submitted function and sends the provisioning
//! request to the winner.
//!
//! Bid requests travel through the topology in simulated time: crossing an edge takes its
//! latency and every node bids with its state at the moment the request is there.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::mem::take;
use std::rc::Rc;

use dslab_core::{cast, log_debug, log_info, Event, EventHandler, SimulationContext};

use crate::core::common::{FunctionId, NodeId, SimComponentId};
use crate::core::events::{BidRequestArrival, ProvisionRequest, SubmitFunction};
use crate::core::sla::{Bid, Sla};
use crate::core::topology::Topology;
use crate::metrics::collector::{FailureReason, Monitoring};
use crate::placement::interface::PlacementStrategy;

/// Request state on one node of its route.
struct Hop {
    node: NodeId,
    caller: Option<NodeId>,
    accumulated_latency: f64,
    /// Hop which forwarded the request here, None for the entry node.
    parent: Option<usize>,
    collected: Vec<Bid>,
    pending: VecDeque<(NodeId, f64)>,
}

/// Bid collection of one function.
struct BidRound {
    sla: Sla,
    hops: Vec<Hop>,
}

pub struct Marketplace {
    ctx: SimulationContext,
    topology: Rc<RefCell<Topology>>,
    /// Fog node components indexed by node id.
    node_components: Vec<SimComponentId>,
    placement_strategy: Box<dyn PlacementStrategy>,
    monitoring: Rc<RefCell<Monitoring>>,
    rounds: HashMap<FunctionId, BidRound>,
}

impl Marketplace {
    pub fn new(
        ctx: SimulationContext,
        topology: Rc<RefCell<Topology>>,
        placement_strategy: Box<dyn PlacementStrategy>,
        monitoring: Rc<RefCell<Monitoring>>,
    ) -> Self {
        Self {
            ctx,
            topology,
            node_components: vec![],
            placement_strategy,
            monitoring,
            rounds: HashMap::new(),
        }
    }

    pub fn set_node_components(&mut self, node_components: Vec<SimComponentId>) {
        self.node_components = node_components;
    }

    pub fn id(&self) -> SimComponentId {
        self.ctx.id()
    }

    pub fn placement_strategy_name(&self) -> &str {
        self.placement_strategy.name()
    }

    fn handle_submission(&mut self, function_id: FunctionId, entry_node: NodeId, sla: Sla) {
        self.monitoring.borrow_mut().record_submission();
        self.rounds.insert(
            function_id,
            BidRound {
                sla,
                hops: vec![Hop {
                    node: entry_node,
                    caller: None,
                    accumulated_latency: 0.0,
                    parent: None,
                    collected: vec![],
                    pending: VecDeque::new(),
                }],
            },
        );
        self.arrive(function_id, 0);
    }

    fn arrive(&mut self, function_id: FunctionId, hop_idx: usize) {
        let Some(round) = self.rounds.get_mut(&function_id) else {
            panic!("Bid request of unknown function {}", function_id);
        };
        let hop = &mut round.hops[hop_idx];
        let visit = self.placement_strategy.arrive(
            &self.topology.borrow(),
            hop.node,
            hop.caller,
            &round.sla,
            hop.accumulated_latency,
        );
        hop.collected = visit.bids;
        hop.pending = visit.branches.into();
        self.advance(function_id, hop_idx);
    }

    /// Forwards the request to the next pending branch of the hop, or answers the caller when
    /// there is none left.
    fn advance(&mut self, function_id: FunctionId, hop_idx: usize) {
        let Some(round) = self.rounds.get_mut(&function_id) else {
            panic!("Bid request of unknown function {}", function_id);
        };
        let hop = &mut round.hops[hop_idx];
        let next = hop.pending.pop_front().filter(|(_, arrival)| {
            self.placement_strategy.continue_after(&hop.collected, *arrival)
        });
        let Some((neighbor, arrival)) = next else {
            hop.pending.clear();
            self.answer(function_id, hop_idx);
            return;
        };

        let delay = arrival - hop.accumulated_latency;
        let caller = hop.node;
        round.hops.push(Hop {
            node: neighbor,
            caller: Some(caller),
            accumulated_latency: arrival,
            parent: Some(hop_idx),
            collected: vec![],
            pending: VecDeque::new(),
        });
        let next_hop = round.hops.len() - 1;
        self.ctx.emit_self(
            BidRequestArrival {
                function_id,
                hop: next_hop,
            },
            delay,
        );
    }

    /// Hands the bids collected on the hop back to the caller. Replies take no time.
    fn answer(&mut self, function_id: FunctionId, hop_idx: usize) {
        let Some(round) = self.rounds.get_mut(&function_id) else {
            panic!("Bid request of unknown function {}", function_id);
        };
        let hop = &mut round.hops[hop_idx];
        self.placement_strategy.depart(
            &self.topology.borrow(),
            hop.node,
            &round.sla,
            hop.accumulated_latency,
            &mut hop.collected,
        );
        let bids = take(&mut hop.collected);
        let parent = hop.parent;
        match parent {
            Some(parent) => {
                self.placement_strategy.merge(&mut round.hops[parent].collected, bids);
                self.advance(function_id, parent);
            }
            None => {
                if let Some(round) = self.rounds.remove(&function_id) {
                    self.close_auction(function_id, round.sla, bids);
                }
            }
        }
    }

    fn close_auction(&mut self, function_id: FunctionId, sla: Sla, bids: Vec<Bid>) {
        log_debug!(self.ctx, "collected {} bids for function {}", bids.len(), function_id);

        let Some(outcome) = self.placement_strategy.select_winner(bids) else {
            log_info!(self.ctx, "function {} got no bid", function_id);
            self.monitoring.borrow_mut().record_failure(
                function_id,
                self.ctx.time(),
                FailureReason::NoBid,
            );
            return;
        };

        log_debug!(
            self.ctx,
            "function {} won by {:?} at price {}",
            function_id,
            outcome.winner.bidder,
            outcome.price
        );
        self.ctx.emit(
            ProvisionRequest {
                function_id,
                sla,
                price: outcome.price,
                accumulated_latency: outcome.winner.accumulated_latency,
            },
            self.node_components[outcome.winner.node],
            0.0,
        );
    }
}

impl EventHandler for Marketplace {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            SubmitFunction {
                function_id,
                entry_node,
                sla,
            } => {
                self.handle_submission(function_id, entry_node, sla);
            }
            BidRequestArrival { function_id, hop } => {
                self.arrive(function_id, hop);
            }
        });
    }
}
