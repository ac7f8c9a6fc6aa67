pub mod config;
pub mod core {
    pub mod common;
    pub mod error;
    pub mod events;
    pub mod fog_node;
    pub mod marketplace;
    pub mod node_component;
    pub mod sla;
    pub mod topology;
}
pub mod metrics {
    pub mod collector;
    pub mod printer;
}
pub mod placement {
    pub mod auction;
    pub mod cloud_only;
    pub mod edge_first;
    pub mod edge_ward;
    pub mod furthest;
    pub mod interface;
    pub mod registry;
}
pub mod pricing {
    pub mod constant;
    pub mod helpers;
    pub mod interface;
    pub mod latency;
    pub mod random;
    pub mod utilization;
}
pub mod simulation_callbacks;
pub mod simulator;
pub mod test_util {
    pub mod helpers;
}
pub mod trace {
    pub mod generator;
    pub mod generic;
    pub mod interface;
}
