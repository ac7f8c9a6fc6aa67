//! Represents generic format for the workload trace that is simplified and convenient.

use std::mem::swap;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigurationError;
use crate::core::sla::Sla;
use crate::trace::interface::{FunctionRequest, Trace};

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct GenericWorkloadTrace {
    pub events: Vec<WorkloadEvent>,
}

/// Arrival is either absolute (`timestamp`) or relative to the previous event (`sleep_before`).
/// An event with neither arrives together with the previous one.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WorkloadEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>, // in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_before: Option<f64>, // in milliseconds
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FunctionSpec {
    pub target_node: String,
    pub mem: f64, // in MiB
    pub cpu: f64, // in millicpu
    pub latency: f64,
    pub duration: f64,
}

impl FunctionSpec {
    fn to_sla(&self) -> Result<Sla, ConfigurationError> {
        for (field, value) in [
            ("mem", self.mem),
            ("cpu", self.cpu),
            ("latency", self.latency),
            ("duration", self.duration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidWorkload(format!(
                    "function for {:?} has invalid {}: {}",
                    self.target_node, field, value
                )));
            }
        }
        Ok(Sla::from_millicpu(
            self.mem,
            self.cpu,
            self.latency,
            self.duration,
        ))
    }
}

impl Trace for GenericWorkloadTrace {
    // Called once to convert and move events.
    fn convert_to_simulator_events(
        &mut self,
    ) -> Result<Vec<(f64, FunctionRequest)>, ConfigurationError> {
        let mut events: Vec<WorkloadEvent> = vec![];
        swap(&mut events, &mut self.events);

        let mut converted_events: Vec<(f64, FunctionRequest)> = Vec::with_capacity(events.len());
        let mut previous_arrival = 0.0;
        for event in events {
            let arrival = match (event.timestamp, event.sleep_before) {
                (Some(_), Some(_)) => {
                    return Err(ConfigurationError::InvalidWorkload(
                        "event has both timestamp and sleep_before".to_string(),
                    ))
                }
                (Some(timestamp), None) => timestamp,
                (None, Some(sleep)) if sleep >= 0.0 => previous_arrival + sleep,
                (None, Some(sleep)) => {
                    return Err(ConfigurationError::InvalidWorkload(format!(
                        "negative sleep_before {}",
                        sleep
                    )))
                }
                (None, None) => previous_arrival,
            };
            if !arrival.is_finite() || arrival < 0.0 {
                return Err(ConfigurationError::InvalidWorkload(format!(
                    "invalid arrival time {}",
                    arrival
                )));
            }
            let sla = event.function.to_sla()?;
            converted_events.push((
                arrival,
                FunctionRequest {
                    target_node: event.function.target_node,
                    sla,
                },
            ));
            previous_arrival = arrival;
        }

        // stable, so simultaneous arrivals keep the trace order
        converted_events.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(converted_events)
    }
}
