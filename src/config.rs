//! Config fields definitions for fog market simulation

use serde::Deserialize;

use crate::metrics::printer::MetricsPrinterConfig;
use crate::pricing::helpers::default_pricing_config;
use crate::pricing::interface::PricingConfig;
use crate::trace::generator::WorkloadGeneratorConfig;

#[derive(Debug, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub sim_name: String,
    pub seed: u64,
    /// If not set default output of logs is stdout/stderr
    pub logs_filepath: Option<String>,
    /// Name of the placement strategy: auction, edge_ward, edge_first, edge_first_v2, furthest
    /// or cloud_only.
    pub placement_strategy: String,
    #[serde(default = "default_pricing_config")]
    pub pricing: PricingConfig,
    pub metrics_printer: Option<MetricsPrinterConfig>,
    /// CSV ledger with one row per granted provisioning.
    pub earnings_output_file: Option<std::path::PathBuf>,
    /// Used when no workload trace is given.
    pub workload_generator: Option<WorkloadGeneratorConfig>,
}
