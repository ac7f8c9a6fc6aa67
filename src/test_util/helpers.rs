use std::rc::Rc;

use crate::config::SimulationConfig;
use crate::core::sla::Sla;
use crate::core::topology::{Topology, TopologyDescription};
use crate::pricing::interface::PricingConfig;
use crate::simulator::FogMarketSimulation;

/// `with_suffix` is appended to the config yaml, so its top-level keys must not be indented.
pub fn default_test_simulation_config(
    placement_strategy: &str,
    with_suffix: Option<&str>,
) -> SimulationConfig {
    let mut default = format!(
        "sim_name: test_fog_market\nseed: 123\nplacement_strategy: {}\n",
        placement_strategy
    );

    if let Some(suffix) = with_suffix {
        default.push_str(suffix);
    }

    serde_yaml::from_str::<SimulationConfig>(&default).unwrap()
}

/// Cloud market node with 16 cores and one edge child with 4 cores, 10 ms away.
pub fn market_and_edge_topology() -> TopologyDescription {
    serde_yaml::from_str(
        r#"
    name: market
    flavor: {core: 16, mem: 65536}
    children:
    - name: edge
      flavor: {core: 4, mem: 8192}
      latency: 10
    "#,
    )
    .unwrap()
}

/// Three levels: market -> two regions -> two edges per region.
pub fn three_level_topology() -> TopologyDescription {
    serde_yaml::from_str(
        r#"
    name: market
    flavor: {core: 64, mem: 262144}
    children:
    - name: region_0
      flavor: {core: 16, mem: 65536}
      latency: 20
      children:
      - name: edge_0
        flavor: {core: 2, mem: 4096}
        latency: 5
      - name: edge_1
        flavor: {core: 2, mem: 4096}
        latency: 8
    - name: region_1
      flavor: {core: 16, mem: 65536}
      latency: 30
      children:
      - name: edge_2
        flavor: {core: 2, mem: 4096}
        latency: 4
      - name: edge_3
        flavor: {core: 2, mem: 4096}
        latency: 6
    "#,
    )
    .unwrap()
}

pub fn constant_pricing(price: f64) -> PricingConfig {
    PricingConfig {
        model_name: "constant".to_string(),
        config: format!("price: {}", price),
        latency_weighting: None,
        tier_price_ratio: 1.0,
    }
}

pub fn build_topology(description: &TopologyDescription, pricing: &PricingConfig) -> Topology {
    Topology::build(description, pricing, 0).unwrap()
}

pub fn make_simulation(
    placement_strategy: &str,
    with_suffix: Option<&str>,
    topology: &TopologyDescription,
) -> FogMarketSimulation {
    let config = default_test_simulation_config(placement_strategy, with_suffix);
    FogMarketSimulation::new(Rc::new(config), topology).unwrap()
}

/// SLA with cpu in millicpu, as in workload traces.
pub fn sla(mem: f64, millicpu: f64, latency: f64, duration: f64) -> Sla {
    Sla::from_millicpu(mem, millicpu, latency, duration)
}
