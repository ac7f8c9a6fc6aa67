//! Events exchanged between the client, the marketplace and fog node components.

use serde::Serialize;

use crate::core::common::{FunctionId, NodeId};
use crate::core::sla::Sla;

/// Event from client to marketplace: a function placement request entering the topology at
/// `entry_node`.
#[derive(Serialize, Clone)]
pub struct SubmitFunction {
    pub function_id: FunctionId,
    pub entry_node: NodeId,
    pub sla: Sla,
}

/// Bid request reaching the next node of its route, after the latency of the crossed edge.
/// `hop` indexes the route state kept by the marketplace for this function.
#[derive(Serialize, Clone)]
pub struct BidRequestArrival {
    pub function_id: FunctionId,
    pub hop: usize,
}

/// Event from marketplace to the winner of the auction, sent as soon as the bids are collected.
#[derive(Serialize, Clone)]
pub struct ProvisionRequest {
    pub function_id: FunctionId,
    pub sla: Sla,
    /// Price charged by the auction.
    pub price: f64,
    pub accumulated_latency: f64,
}

/// Event from fog node component to itself when the SLA duration of a function is over.
#[derive(Serialize, Clone)]
pub struct ReleaseResources {
    pub function_id: FunctionId,
}
