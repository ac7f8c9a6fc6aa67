use dslab_fog_market::simulator::FogMarketSimulation;

/// Usage of every node matches the sum of the functions it holds and never exceeds its capacity.
pub fn check_node_usage_is_consistent(sim: &FogMarketSimulation) {
    let topology = sim.topology.borrow();
    for node in topology.nodes() {
        let cores: f64 = node.provisioned.iter().map(|f| f.sla.core).sum();
        let mem: f64 = node.provisioned.iter().map(|f| f.sla.mem).sum();
        assert!((node.cores_used - cores).abs() < 1e-9, "{:?}", node);
        assert!((node.mem_used - mem).abs() < 1e-9, "{:?}", node);
        assert!(node.cores_used <= node.cores + 1e-9, "{:?}", node);
        assert!(node.mem_used <= node.mem + 1e-9, "{:?}", node);
    }
}

pub fn check_all_nodes_are_idle(sim: &FogMarketSimulation) {
    let topology = sim.topology.borrow();
    for node in topology.nodes() {
        assert!(node.provisioned.is_empty(), "{:?}", node);
        assert_eq!(node.cores_used, 0.0);
        assert_eq!(node.mem_used, 0.0);
    }
}

pub fn node_cores_used(sim: &FogMarketSimulation, name: &str) -> f64 {
    sim.topology.borrow().node_by_name(name).unwrap().cores_used
}
