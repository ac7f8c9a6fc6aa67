//! Synthetic workload generator.

use rand::prelude::*;
use rand_distr::{Exp, LogNormal, Normal};
use rand_pcg::Pcg64;
use serde::Deserialize;

use crate::core::error::ConfigurationError;
use crate::trace::generic::{FunctionSpec, GenericWorkloadTrace, WorkloadEvent};

#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq)]
pub enum ArrivalProcess {
    /// Arrivals drawn uniformly over the experiment duration.
    #[default]
    Uniform,
    /// Exponential inter-arrival times with the mean spreading all arrivals over the experiment
    /// duration.
    Poisson,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogNormalParams {
    pub mu: f64,
    pub sigma: f64,
}

fn default_latency() -> NormalParams {
    NormalParams {
        mean: 70.0,
        std_dev: 30.0,
    }
}

fn default_duration() -> LogNormalParams {
    LogNormalParams {
        mu: -0.38,
        sigma: 2.36,
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkloadGeneratorConfig {
    /// Entry nodes of generated functions. All leaves of the topology when not set.
    #[serde(default)]
    pub target_nodes: Option<Vec<String>>,
    pub functions_per_node: usize,
    pub experiment_duration: f64, // in milliseconds
    #[serde(default)]
    pub arrivals: ArrivalProcess,
    pub mem: f64, // in MiB
    pub cpu: f64, // in millicpu
    /// Latency bound in ms: `max(1, ceil(Normal(mean, std_dev)))`.
    #[serde(default = "default_latency")]
    pub latency: NormalParams,
    /// Duration in ms: `ceil(1000 * LogNormal(mu, sigma))`.
    #[serde(default = "default_duration")]
    pub duration: LogNormalParams,
}

/// Generates a trace with `functions_per_node` functions for every target node.
pub fn generate_workload_trace(
    config: &WorkloadGeneratorConfig,
    target_nodes: &[String],
    seed: u64,
) -> Result<GenericWorkloadTrace, ConfigurationError> {
    let invalid = |e: String| ConfigurationError::InvalidWorkload(format!("generator: {}", e));
    let latency_distribution = Normal::new(config.latency.mean, config.latency.std_dev)
        .map_err(|e| invalid(e.to_string()))?;
    let duration_distribution = LogNormal::new(config.duration.mu, config.duration.sigma)
        .map_err(|e| invalid(e.to_string()))?;
    if !config.experiment_duration.is_finite() || config.experiment_duration < 0.0 {
        return Err(invalid(format!(
            "experiment_duration {}",
            config.experiment_duration
        )));
    }
    if config.mem < 0.0 || config.cpu < 0.0 {
        return Err(invalid("mem and cpu must be non-negative".to_string()));
    }

    let mut gen = Pcg64::seed_from_u64(seed);
    let mut arrivals: Vec<(f64, FunctionSpec)> = vec![];
    for target_node in target_nodes {
        let times = match config.arrivals {
            ArrivalProcess::Uniform => (0..config.functions_per_node)
                .map(|_| gen.gen_range(0.0..=config.experiment_duration))
                .collect::<Vec<f64>>(),
            ArrivalProcess::Poisson => {
                poisson_arrivals(&mut gen, config.functions_per_node, config.experiment_duration)
            }
        };
        for time in times {
            let latency = latency_distribution.sample(&mut gen).ceil().max(1.0);
            let duration = (1000.0 * duration_distribution.sample(&mut gen)).ceil();
            arrivals.push((
                time,
                FunctionSpec {
                    target_node: target_node.clone(),
                    mem: config.mem,
                    cpu: config.cpu,
                    latency,
                    duration,
                },
            ));
        }
    }
    arrivals.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(GenericWorkloadTrace {
        events: arrivals
            .into_iter()
            .map(|(time, function)| WorkloadEvent {
                timestamp: Some(time),
                sleep_before: None,
                function,
            })
            .collect(),
    })
}

fn poisson_arrivals(gen: &mut Pcg64, count: usize, duration: f64) -> Vec<f64> {
    if count == 0 || duration == 0.0 {
        return vec![0.0; count];
    }
    let Ok(interval) = Exp::new(count as f64 / duration) else {
        return vec![0.0; count];
    };
    let mut time = 0.0;
    (0..count)
        .map(|_| {
            time += interval.sample(gen);
            time
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::trace::generator::{generate_workload_trace, ArrivalProcess, WorkloadGeneratorConfig};
    use crate::trace::interface::Trace;

    fn config(arrivals: ArrivalProcess) -> WorkloadGeneratorConfig {
        serde_yaml::from_str::<WorkloadGeneratorConfig>(&format!(
            r#"
            functions_per_node: 50
            experiment_duration: 60000
            arrivals: {:?}
            mem: 100
            cpu: 150
            "#,
            arrivals
        ))
        .unwrap()
    }

    #[test]
    fn test_generated_trace_is_ordered_and_bounded() {
        let nodes = vec!["edge_0".to_string(), "edge_1".to_string()];
        let mut trace =
            generate_workload_trace(&config(ArrivalProcess::Uniform), &nodes, 42).unwrap();
        assert_eq!(trace.events.len(), 100);

        let requests = trace.convert_to_simulator_events().unwrap();
        assert!(requests.windows(2).all(|w| w[0].0 <= w[1].0));
        for (time, request) in requests {
            assert!((0.0..=60000.0).contains(&time));
            assert!(request.sla.latency >= 1.0);
            assert_eq!(request.sla.latency, request.sla.latency.ceil());
            assert_eq!(request.sla.core, 0.15);
            assert!(nodes.contains(&request.target_node));
        }
    }

    #[test]
    fn test_generation_is_reproducible() {
        let nodes = vec!["edge".to_string()];
        let config = config(ArrivalProcess::Poisson);
        assert_eq!(
            generate_workload_trace(&config, &nodes, 7).unwrap(),
            generate_workload_trace(&config, &nodes, 7).unwrap()
        );
        assert_ne!(
            generate_workload_trace(&config, &nodes, 7).unwrap(),
            generate_workload_trace(&config, &nodes, 8).unwrap()
        );
    }
}
