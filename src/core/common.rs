//! Identifiers shared between simulation components.

/// Identifier of a dslab component (marketplace, fog node, client).
pub type SimComponentId = u32;

/// Identifier of a submitted function, assigned in the order of arrival in the workload.
pub type FunctionId = u64;

/// Index of a fog node inside the topology arena.
pub type NodeId = usize;
