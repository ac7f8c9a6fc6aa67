//! Simulation callbacks interface and implementations to define how simulator should behave on start,
//! step, finish and when it should stop running.

use log::{error, info};

use crate::metrics::printer::{print_metrics, write_earnings_csv_file};
use crate::simulator::FogMarketSimulation;

pub trait SimulationCallbacks {
    /// Runs before starting a simulation run.
    fn on_simulation_start(&mut self, _sim: &mut FogMarketSimulation) {}

    /// Runs on each step of a simulation run, returns false if the simulation must be stopped.
    fn on_step(&mut self, _sim: &mut FogMarketSimulation) -> bool {
        true
    }

    /// Runs upon the completion of a simulation run, returns results of this run.
    fn on_simulation_finish(&mut self, _sim: &mut FogMarketSimulation) {}
}

/// Writes the configured metrics summary and earnings ledger.
pub fn print_report(sim: &FogMarketSimulation) {
    {
        let monitoring = sim.monitoring.borrow();
        info!(
            "Submitted {}, provisioned {}, failed {} (no bid {}, race lost {}), earned {:.3}",
            monitoring.total_submitted,
            monitoring.total_provisioned,
            monitoring.total_failed(),
            monitoring.failed_no_bid,
            monitoring.failed_race_lost,
            monitoring.total_earnings()
        );
    }
    if let Some(printer_config) = &sim.config.metrics_printer {
        if let Err(e) = print_metrics(sim.monitoring.clone(), printer_config) {
            error!(
                "Failed to write metrics to {:?}: {}",
                printer_config.output_file, e
            );
        }
    }
    if let Some(output_file) = &sim.config.earnings_output_file {
        let monitoring = sim.monitoring.borrow();
        if let Err(e) = write_earnings_csv_file(&monitoring, &sim.run_info(), output_file) {
            error!("Failed to write earnings to {:?}: {}", output_file, e);
        }
    }
}

pub struct RunUntilAllFunctionsSettledCallbacks {}

/// Returns true if every submitted function was either released or failed.
fn check_all_functions_settled(sim: &FogMarketSimulation) -> bool {
    sim.monitoring.borrow().settled() >= sim.submitted_functions
}

impl SimulationCallbacks for RunUntilAllFunctionsSettledCallbacks {
    fn on_step(&mut self, sim: &mut FogMarketSimulation) -> bool {
        !check_all_functions_settled(sim)
    }

    fn on_simulation_finish(&mut self, sim: &mut FogMarketSimulation) {
        {
            let monitoring = sim.monitoring.borrow();
            assert_eq!(
                monitoring.total_submitted,
                monitoring.total_provisioned + monitoring.total_failed()
            );
            assert_eq!(monitoring.currently_provisioned, 0);
        }
        print_report(sim);
    }
}

/// Stops once the simulated time reaches the deadline, functions may still hold resources then.
pub struct RunUntilDeadlineCallbacks {
    deadline_time: f64,
}

impl RunUntilDeadlineCallbacks {
    pub fn new(deadline_time: f64) -> Self {
        Self { deadline_time }
    }
}

impl SimulationCallbacks for RunUntilDeadlineCallbacks {
    fn on_step(&mut self, sim: &mut FogMarketSimulation) -> bool {
        sim.sim.time() < self.deadline_time
    }

    fn on_simulation_finish(&mut self, sim: &mut FogMarketSimulation) {
        print_report(sim);
    }
}
