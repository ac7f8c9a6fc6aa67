// Interface for any workload trace which serves as input to the simulator.

use crate::core::error::ConfigurationError;
use crate::core::sla::Sla;

/// Function placement request as read from a trace, before it gets an id and its target node is
/// resolved in the topology.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRequest {
    pub target_node: String,
    pub sla: Sla,
}

// Any trace format acceptable by simulator.
pub trait Trace {
    // Converts trace events to requests paired with their arrival time in ms, ordered by arrival.
    // Requests with equal arrival time keep the trace order.
    fn convert_to_simulator_events(
        &mut self,
    ) -> Result<Vec<(f64, FunctionRequest)>, ConfigurationError>;
}
