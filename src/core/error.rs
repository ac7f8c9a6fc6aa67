//! Errors which abort the simulation setup.
//!
//! Failures which happen during the run (no bid found, lost race at commit) are not errors,
//! they are recorded by the monitoring instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("node name {0:?} is used more than once in the topology")]
    DuplicateNodeName(String),

    #[error("node {0:?} is not present in the topology")]
    UnknownNode(String),

    #[error("node {name:?} must have strictly positive capacity, got core={core}, mem={mem}")]
    NonPositiveCapacity { name: String, core: f64, mem: f64 },

    #[error("link to node {name:?} has invalid characteristics: {reason}")]
    InvalidLink { name: String, reason: String },

    #[error("node {0:?} is unreachable from the rest of the topology")]
    UnreachableNode(String),

    #[error("unknown placement strategy {0:?}")]
    UnknownPlacementStrategy(String),

    #[error("invalid pricing configuration: {0}")]
    InvalidPricing(String),

    #[error("invalid workload: {0}")]
    InvalidWorkload(String),
}
