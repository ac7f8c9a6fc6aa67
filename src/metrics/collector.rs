//! Implements centralized storage for metrics of a simulation run. The marketplace and fog node
//! components report submissions, failures, grants and releases here.

use std::collections::BTreeMap;

use average::{concatenate, Estimate, Max, Mean, Min, Variance};
use serde::Serialize;

use crate::core::common::FunctionId;

concatenate!(
    Estimator,
    [Min, min],
    [Max, max],
    [Mean, mean],
    [Variance, population_variance]
);

#[derive(Debug, Default)]
pub struct EstimatorWrapper {
    estimator: Estimator,
    count: u64,
}

impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Estimator")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("mean", &self.mean)
            .field("population_variance", &self.population_variance)
            .finish()
    }
}

impl EstimatorWrapper {
    pub fn new() -> Self {
        Self {
            estimator: Estimator::new(),
            count: 0,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.estimator.add(value);
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> f64 {
        self.estimator.min()
    }

    pub fn max(&self) -> f64 {
        self.estimator.max()
    }

    pub fn mean(&self) -> f64 {
        self.estimator.mean()
    }

    pub fn population_variance(&self) -> f64 {
        self.estimator.population_variance()
    }
}

/// One granted provisioning. Records are never removed, also after the resources are released.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningRecord {
    pub function_id: FunctionId,
    pub node: String,
    pub level: usize,
    /// Price charged by the auction.
    pub price: f64,
    pub accumulated_latency: f64,
    pub sla_latency: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub cpu_reserved: f64,
    pub node_total_cpu: f64,
    pub mem_reserved: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    /// Nobody in the explored region could satisfy the SLA.
    NoBid,
    /// The winner had no room left when the provisioning request arrived.
    RaceLostAtCommit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub function_id: FunctionId,
    pub time: f64,
    pub reason: FailureReason,
}

/// Earnings aggregated over a group of records (one node or one level).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsSummary {
    pub key: String,
    pub provisioned: usize,
    pub total: f64,
    pub median: f64,
    pub quantile_90: f64,
}

#[derive(Debug, Default)]
pub struct Monitoring {
    /// Functions holding resources right now.
    pub currently_provisioned: u64,
    /// Lifetime counter of granted provisionings.
    pub total_provisioned: u64,
    pub total_submitted: u64,
    pub total_released: u64,
    pub failed_no_bid: u64,
    pub failed_race_lost: u64,

    /// Earning records per node name, in grant order.
    pub earnings: BTreeMap<String, Vec<EarningRecord>>,
    pub failures: Vec<FailureRecord>,

    /// Estimations for the price charged to the winners.
    pub price_stats: EstimatorWrapper,
    /// Estimations for the latency accumulated by the request when reaching the winner.
    pub accumulated_latency_stats: EstimatorWrapper,
}

impl Monitoring {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn record_submission(&mut self) {
        self.total_submitted += 1;
    }

    pub fn record_failure(&mut self, function_id: FunctionId, time: f64, reason: FailureReason) {
        match reason {
            FailureReason::NoBid => self.failed_no_bid += 1,
            FailureReason::RaceLostAtCommit => self.failed_race_lost += 1,
        }
        self.failures.push(FailureRecord {
            function_id,
            time,
            reason,
        });
    }

    pub fn record_provisioned(&mut self, record: EarningRecord) {
        self.currently_provisioned += 1;
        self.total_provisioned += 1;
        self.price_stats.add(record.price);
        self.accumulated_latency_stats
            .add(record.accumulated_latency);
        self.earnings
            .entry(record.node.clone())
            .or_default()
            .push(record);
    }

    pub fn record_released(&mut self) {
        self.currently_provisioned = self.currently_provisioned.saturating_sub(1);
        self.total_released += 1;
    }

    /// Equals to `total_submitted - total_provisioned` once every submission is processed.
    pub fn total_failed(&self) -> u64 {
        self.failed_no_bid + self.failed_race_lost
    }

    /// Functions which will not change state anymore: released or failed.
    pub fn settled(&self) -> u64 {
        self.total_released + self.total_failed()
    }

    pub fn records(&self) -> impl Iterator<Item = &EarningRecord> {
        self.earnings.values().flatten()
    }

    pub fn total_earnings(&self) -> f64 {
        self.records().map(|r| r.price).sum()
    }

    pub fn earnings_by_node(&self) -> Vec<EarningsSummary> {
        self.earnings
            .iter()
            .map(|(node, records)| {
                summarize(node.clone(), records.iter().map(|r| r.price).collect())
            })
            .collect()
    }

    pub fn earnings_by_level(&self) -> Vec<EarningsSummary> {
        let mut by_level: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        for record in self.records() {
            by_level.entry(record.level).or_default().push(record.price);
        }
        by_level
            .into_iter()
            .map(|(level, prices)| summarize(level.to_string(), prices))
            .collect()
    }
}

fn summarize(key: String, mut prices: Vec<f64>) -> EarningsSummary {
    prices.sort_by(|a, b| a.total_cmp(b));
    EarningsSummary {
        key,
        provisioned: prices.len(),
        total: prices.iter().sum(),
        median: quantile(&prices, 0.5),
        quantile_90: quantile(&prices, 0.9),
    }
}

/// Quantile of sorted values with linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}
