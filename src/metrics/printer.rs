use prettytable::{row, Table};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, fs::File, io::Write, path::Path, rc::Rc};

use crate::metrics::collector::{EarningsSummary, EstimatorWrapper, Monitoring};

#[derive(Debug, Default, Deserialize, PartialEq)]
pub enum OutputFormat {
    #[default]
    JSON,
    PrettyTable,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct MetricsPrinterConfig {
    pub format: OutputFormat,
    pub output_file: std::path::PathBuf,
}

/// Describes the run a ledger belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub job_id: String,
    pub placement_strategy: String,
    pub pricing_strategy: String,
    pub seed: u64,
    pub simulation_duration: f64,
    pub node_count: usize,
}

pub fn print_metrics(
    monitoring: Rc<RefCell<Monitoring>>,
    config: &MetricsPrinterConfig,
) -> std::io::Result<()> {
    match config.format {
        OutputFormat::PrettyTable => print_metrics_as_pretty_table(monitoring, &config.output_file),
        OutputFormat::JSON => print_metrics_as_json(monitoring, &config.output_file),
    }
}

fn add_summary_rows(table: &mut Table, title: &str, summaries: &[EarningsSummary]) {
    table.add_row(row![title, "Provisioned", "Total", "Median", "90th quantile"]);
    for summary in summaries {
        table.add_row(row![
            summary.key,
            summary.provisioned,
            summary.total,
            summary.median,
            summary.quantile_90
        ]);
    }
}

pub fn print_metrics_as_pretty_table(
    monitoring: Rc<RefCell<Monitoring>>,
    output_file: &Path,
) -> std::io::Result<()> {
    let metrics = monitoring.borrow();
    let mut metrics_file = File::create(output_file)?;

    let mut aggregated_table = Table::new();
    aggregated_table.add_row(row!["Metric", "Count"]);
    aggregated_table.add_row(row!["Functions submitted", metrics.total_submitted]);
    aggregated_table.add_row(row!["Functions provisioned", metrics.total_provisioned]);
    aggregated_table.add_row(row!["Functions released", metrics.total_released]);
    aggregated_table.add_row(row!["Currently provisioned", metrics.currently_provisioned]);
    aggregated_table.add_row(row!["Failed, no bid", metrics.failed_no_bid]);
    aggregated_table.add_row(row!["Failed, race lost", metrics.failed_race_lost]);

    let mut stats_table = Table::new();
    stats_table.add_row(row!["Metric", "Count", "Min", "Max", "Mean", "Variance"]);
    for (name, stats) in [
        ("Charged price", &metrics.price_stats),
        ("Accumulated latency", &metrics.accumulated_latency_stats),
    ] {
        stats_table.add_row(row![
            name,
            stats.count(),
            stats.min(),
            stats.max(),
            stats.mean(),
            stats.population_variance()
        ]);
    }

    let mut earnings_table = Table::new();
    add_summary_rows(&mut earnings_table, "Node", &metrics.earnings_by_node());
    add_summary_rows(&mut earnings_table, "Level", &metrics.earnings_by_level());

    aggregated_table.print(&mut metrics_file)?;
    stats_table.print(&mut metrics_file)?;
    earnings_table.print(&mut metrics_file)?;
    Ok(())
}

#[derive(Serialize)]
struct MetricsJSON {
    counters: Counters,
    stats: Stats,
    earnings_by_node: Vec<EarningsSummary>,
    earnings_by_level: Vec<EarningsSummary>,
}

#[derive(Serialize)]
struct Counters {
    total_submitted: u64,
    total_provisioned: u64,
    total_released: u64,
    currently_provisioned: u64,
    failed_no_bid: u64,
    failed_race_lost: u64,
}

#[derive(Serialize)]
struct Stats {
    charged_price: EstimatorStats,
    accumulated_latency: EstimatorStats,
}

#[derive(Serialize)]
struct EstimatorStats {
    count: u64,
    min: f64,
    max: f64,
    mean: f64,
    variance: f64,
}

impl From<&EstimatorWrapper> for EstimatorStats {
    fn from(stats: &EstimatorWrapper) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            variance: stats.population_variance(),
        }
    }
}

pub fn print_metrics_as_json(
    monitoring: Rc<RefCell<Monitoring>>,
    output_file: &Path,
) -> std::io::Result<()> {
    let metrics = monitoring.borrow();
    let mut metrics_file = File::create(output_file)?;

    let json = MetricsJSON {
        counters: Counters {
            total_submitted: metrics.total_submitted,
            total_provisioned: metrics.total_provisioned,
            total_released: metrics.total_released,
            currently_provisioned: metrics.currently_provisioned,
            failed_no_bid: metrics.failed_no_bid,
            failed_race_lost: metrics.failed_race_lost,
        },
        stats: Stats {
            charged_price: (&metrics.price_stats).into(),
            accumulated_latency: (&metrics.accumulated_latency_stats).into(),
        },
        earnings_by_node: metrics.earnings_by_node(),
        earnings_by_level: metrics.earnings_by_level(),
    };

    let serialized_json = serde_json::to_string_pretty(&json)?;
    metrics_file.write_all(serialized_json.as_bytes())
}

#[derive(Serialize)]
struct LedgerRow<'a> {
    job_id: &'a str,
    node: &'a str,
    placement_strategy: &'a str,
    pricing_strategy: &'a str,
    seed: u64,
    level: usize,
    earning: f64,
    accumulated_latency: f64,
    sla_latency: f64,
    start_time: f64,
    end_time: f64,
    cpu_reserved: f64,
    node_total_cpu: f64,
    simulation_duration: f64,
    submitted: u64,
    node_count: usize,
}

/// Writes one row per earning record.
pub fn write_earnings_csv<W: Write>(
    monitoring: &Monitoring,
    run: &RunInfo,
    writer: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in monitoring.records() {
        writer.serialize(LedgerRow {
            job_id: &run.job_id,
            node: &record.node,
            placement_strategy: &run.placement_strategy,
            pricing_strategy: &run.pricing_strategy,
            seed: run.seed,
            level: record.level,
            earning: record.price,
            accumulated_latency: record.accumulated_latency,
            sla_latency: record.sla_latency,
            start_time: record.start_time,
            end_time: record.end_time,
            cpu_reserved: record.cpu_reserved,
            node_total_cpu: record.node_total_cpu,
            simulation_duration: run.simulation_duration,
            submitted: monitoring.total_submitted,
            node_count: run.node_count,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_earnings_csv_file(
    monitoring: &Monitoring,
    run: &RunInfo,
    output_file: &Path,
) -> Result<(), csv::Error> {
    write_earnings_csv(monitoring, run, File::create(output_file)?)
}

#[cfg(test)]
mod tests {
    use crate::metrics::collector::{EarningRecord, Monitoring};
    use crate::metrics::printer::{write_earnings_csv, EstimatorStats, RunInfo};

    #[test]
    fn test_csv_ledger_has_header_and_row_per_record() {
        let mut monitoring = Monitoring::new();
        monitoring.record_submission();
        monitoring.record_provisioned(EarningRecord {
            function_id: 0,
            node: "edge".to_string(),
            level: 1,
            price: 2.5,
            accumulated_latency: 0.0,
            sla_latency: 15.0,
            start_time: 0.0,
            end_time: 5000.0,
            cpu_reserved: 1.0,
            node_total_cpu: 4.0,
            mem_reserved: 100.0,
        });
        let run = RunInfo {
            job_id: "job".to_string(),
            placement_strategy: "auction".to_string(),
            pricing_strategy: "linear".to_string(),
            seed: 1,
            simulation_duration: 5000.0,
            node_count: 2,
        };

        let mut buffer = vec![];
        write_earnings_csv(&monitoring, &run, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("job_id,node,placement_strategy,pricing_strategy,seed,level"));
        assert_eq!(
            lines[1],
            "job,edge,auction,linear,1,1,2.5,0.0,15.0,0.0,5000.0,1.0,4.0,5000.0,1,2"
        );
    }

    #[test]
    fn test_estimator_stats_report_count() {
        let mut monitoring = Monitoring::new();
        for (function_id, price) in [(0, 1.0), (1, 3.0)] {
            monitoring.record_submission();
            monitoring.record_provisioned(EarningRecord {
                function_id,
                node: "edge".to_string(),
                level: 1,
                price,
                accumulated_latency: 0.0,
                sla_latency: 15.0,
                start_time: 0.0,
                end_time: 100.0,
                cpu_reserved: 1.0,
                node_total_cpu: 4.0,
                mem_reserved: 100.0,
            });
        }

        let stats = EstimatorStats::from(&monitoring.price_stats);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
    }
}
