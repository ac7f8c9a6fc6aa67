//! Represents entry point for simulator.

use log::info;
use std::time::Instant;
use std::{cell::RefCell, rc::Rc};

use dslab_core::simulation::Simulation;
use dslab_core::SimulationContext;

use crate::config::SimulationConfig;
use crate::core::common::{FunctionId, NodeId, SimComponentId};
use crate::core::error::ConfigurationError;
use crate::core::events::SubmitFunction;
use crate::core::marketplace::Marketplace;
use crate::core::node_component::FogNodeComponent;
use crate::core::sla::Sla;
use crate::core::topology::{Topology, TopologyDescription};
use crate::metrics::collector::Monitoring;
use crate::metrics::printer::RunInfo;
use crate::placement::registry::resolve_placement_strategy;
use crate::simulation_callbacks::SimulationCallbacks;
use crate::trace::generator::generate_workload_trace;
use crate::trace::generic::GenericWorkloadTrace;
use crate::trace::interface::Trace;

pub struct FogMarketSimulation {
    pub config: Rc<SimulationConfig>,
    pub sim: Simulation,

    pub topology: Rc<RefCell<Topology>>,
    pub marketplace: Rc<RefCell<Marketplace>>,
    /// Fog node components indexed by node id.
    pub node_components: Vec<Rc<RefCell<FogNodeComponent>>>,
    pub monitoring: Rc<RefCell<Monitoring>>,

    // Client context for submitting functions to the marketplace
    client: SimulationContext,
    marketplace_id: SimComponentId,
    /// Number of functions pushed to the simulation queue so far, also the next function id.
    pub submitted_functions: u64,
}

impl FogMarketSimulation {
    pub fn new(
        config: Rc<SimulationConfig>,
        topology_description: &TopologyDescription,
    ) -> Result<Self, ConfigurationError> {
        info!(
            "Creating fog market simulation {:?} with config: {:?}",
            config.sim_name, config
        );

        let placement_strategy = resolve_placement_strategy(&config.placement_strategy)?;
        let topology = Rc::new(RefCell::new(Topology::build(
            topology_description,
            &config.pricing,
            config.seed,
        )?));
        info!(
            "Topology has {} nodes, max level {}",
            topology.borrow().len(),
            topology.borrow().max_level()
        );

        let mut sim = Simulation::new(config.seed);
        let monitoring = Rc::new(RefCell::new(Monitoring::new()));

        // Register simulator components
        let marketplace_component_name = "marketplace";
        let marketplace_context = sim.create_context(marketplace_component_name);
        let marketplace = Rc::new(RefCell::new(Marketplace::new(
            marketplace_context,
            topology.clone(),
            placement_strategy,
            monitoring.clone(),
        )));
        let marketplace_id = sim.add_handler(marketplace_component_name, marketplace.clone());

        let mut node_components = vec![];
        let mut node_component_ids = vec![];
        for node in topology.borrow().nodes() {
            let component_name = format!("node_{}", node.name);
            let node_context = sim.create_context(&component_name);
            let node_component = Rc::new(RefCell::new(FogNodeComponent::new(
                node_context,
                node.id,
                topology.clone(),
                monitoring.clone(),
            )));
            node_component_ids.push(sim.add_handler(&component_name, node_component.clone()));
            node_components.push(node_component);
        }
        marketplace
            .borrow_mut()
            .set_node_components(node_component_ids);

        let client = sim.create_context("client");

        Ok(FogMarketSimulation {
            config,
            sim,
            topology,
            marketplace,
            node_components,
            monitoring,
            client,
            marketplace_id,
            submitted_functions: 0,
        })
    }

    /// Reads the whole trace and pushes its functions to the simulation queue at their arrival
    /// times. Nothing is submitted if any function targets an unknown node.
    pub fn initialize(&mut self, workload_trace: &mut dyn Trace) -> Result<(), ConfigurationError> {
        let events = workload_trace.convert_to_simulator_events()?;
        let mut resolved: Vec<(f64, NodeId, Sla)> = Vec::with_capacity(events.len());
        for (arrival, request) in events {
            let entry_node = self.resolve_node(&request.target_node)?;
            resolved.push((arrival, entry_node, request.sla));
        }

        let now = self.sim.time();
        for (arrival, entry_node, sla) in resolved {
            self.emit_submission((arrival - now).max(0.0), entry_node, sla);
        }
        info!("Submitted {} functions from trace", self.submitted_functions);
        Ok(())
    }

    /// Builds the synthetic workload configured in `workload_generator`. Targets every leaf of the
    /// topology unless target nodes are given explicitly.
    pub fn generate_workload(&self) -> Result<GenericWorkloadTrace, ConfigurationError> {
        let Some(generator_config) = &self.config.workload_generator else {
            return Err(ConfigurationError::InvalidWorkload(
                "neither workload trace nor workload generator is configured".to_string(),
            ));
        };
        let target_nodes = match &generator_config.target_nodes {
            Some(nodes) => nodes.clone(),
            None => self
                .topology
                .borrow()
                .nodes()
                .filter(|node| node.children.is_empty())
                .map(|node| node.name.clone())
                .collect(),
        };
        generate_workload_trace(generator_config, &target_nodes, self.config.seed)
    }

    /// Submits a single function entering the topology at `target_node` after `delay`.
    pub fn submit(
        &mut self,
        target_node: &str,
        sla: Sla,
        delay: f64,
    ) -> Result<FunctionId, ConfigurationError> {
        let entry_node = self.resolve_node(target_node)?;
        Ok(self.emit_submission(delay, entry_node, sla))
    }

    fn resolve_node(&self, name: &str) -> Result<NodeId, ConfigurationError> {
        self.topology
            .borrow()
            .node_id(name)
            .ok_or_else(|| ConfigurationError::UnknownNode(name.to_string()))
    }

    fn emit_submission(&mut self, delay: f64, entry_node: NodeId, sla: Sla) -> FunctionId {
        let function_id = self.submitted_functions;
        self.client.emit(
            SubmitFunction {
                function_id,
                entry_node,
                sla,
            },
            self.marketplace_id,
            delay,
        );
        self.submitted_functions += 1;
        function_id
    }

    pub fn pricing_strategy_name(&self) -> String {
        let topology = self.topology.borrow();
        topology
            .node(topology.root())
            .pricing_strategy
            .name()
            .to_string()
    }

    pub fn run_info(&self) -> RunInfo {
        RunInfo {
            job_id: self.config.sim_name.clone(),
            placement_strategy: self
                .marketplace
                .borrow()
                .placement_strategy_name()
                .to_string(),
            pricing_strategy: self.pricing_strategy_name(),
            seed: self.config.seed,
            simulation_duration: self.sim.time(),
            node_count: self.topology.borrow().len(),
        }
    }

    pub fn run_with_callbacks(&mut self, mut callbacks: Box<dyn SimulationCallbacks>) {
        callbacks.on_simulation_start(self);

        let t = Instant::now();
        while callbacks.on_step(self) {
            if !self.sim.step() {
                break;
            }
        }
        let duration = t.elapsed().as_secs_f64();
        info!(
            "Processed {} events in {:.2?}s ({:.0} events/s)",
            self.sim.event_count(),
            duration,
            self.sim.event_count() as f64 / duration
        );
        info!("Finished at {}", self.sim.time());

        callbacks.on_simulation_finish(self);
    }

    pub fn run_until_no_events(&mut self) {
        // Run simulation until completion of all events and measure time.
        let t = Instant::now();
        self.sim.step_until_no_events();
        let duration = t.elapsed().as_secs_f64();
        info!(
            "Processed {} events in {:.2?}s ({:.0} events/s)",
            self.sim.event_count(),
            duration,
            self.sim.event_count() as f64 / duration
        );
    }

    /// Returns `true` if there could be more pending events and `false` otherwise.
    pub fn step(&mut self) -> bool {
        self.sim.step()
    }

    /// Returns `true` if there could be more pending events and `false` otherwise.
    pub fn step_for_duration(&mut self, duration: f64) -> bool {
        self.sim.step_for_duration(duration)
    }

    pub fn current_time(&self) -> f64 {
        self.sim.time()
    }
}
