use clap::Parser;
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use log::{error, info};
use std::env;
use std::rc::Rc;

use dslab_fog_market::config::SimulationConfig;
use dslab_fog_market::core::error::ConfigurationError;
use dslab_fog_market::core::topology::TopologyDescription;
use dslab_fog_market::simulation_callbacks::{
    RunUntilAllFunctionsSettledCallbacks, RunUntilDeadlineCallbacks, SimulationCallbacks,
};
use dslab_fog_market::simulator::FogMarketSimulation;
use dslab_fog_market::trace::generic::GenericWorkloadTrace;

#[derive(Parser)]
struct Args {
    #[clap(short, long)]
    config_file: std::path::PathBuf,
    #[clap(short, long)]
    topology_file: std::path::PathBuf,
    /// Synthetic workload from the config is generated when not set.
    #[clap(short, long)]
    workload_trace_file: Option<std::path::PathBuf>,
    /// Stop at this simulated time (ms) instead of waiting for every function to be released.
    #[clap(long)]
    deadline: Option<f64>,
}

fn init_logger(logs_filepath: &Option<String>) {
    // log level INFO by default
    let mut env_logger_builder = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        env_logger_builder.filter_level(log::LevelFilter::Info);
    }
    if let Some(path) = logs_filepath {
        let log = FileRotate::new(
            path,
            AppendCount::new(5),
            ContentLimit::Bytes(100 * 1024 * 1024),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        env_logger_builder.target(env_logger::Target::Pipe(Box::new(log)));
    }
    env_logger_builder.init();
}

fn run(args: &Args, config: SimulationConfig) -> Result<(), ConfigurationError> {
    info!(
        "Path to topology file: {:?}",
        args.topology_file.canonicalize().unwrap()
    );
    let topology_yaml =
        std::fs::read_to_string(&args.topology_file).expect("could not read topology file");
    let topology = serde_yaml::from_str::<TopologyDescription>(&topology_yaml)
        .expect("could not parse topology file");

    let mut simulation = FogMarketSimulation::new(Rc::new(config), &topology)?;

    let mut workload_trace = match &args.workload_trace_file {
        Some(path) => {
            info!("Path to workload trace file: {:?}", path.canonicalize().unwrap());
            let workload_trace_yaml =
                std::fs::read_to_string(path).expect("could not read trace file");
            serde_yaml::from_str::<GenericWorkloadTrace>(&workload_trace_yaml)
                .expect("could not parse trace file")
        }
        None => simulation.generate_workload()?,
    };
    simulation.initialize(&mut workload_trace)?;

    let callbacks: Box<dyn SimulationCallbacks> = match args.deadline {
        Some(deadline) => Box::new(RunUntilDeadlineCallbacks::new(deadline)),
        None => Box::new(RunUntilAllFunctionsSettledCallbacks {}),
    };
    simulation.run_with_callbacks(callbacks);
    Ok(())
}

fn main() {
    let args = Args::parse();

    let config_yaml =
        std::fs::read_to_string(&args.config_file).expect("could not read config file");
    let config = serde_yaml::from_str::<SimulationConfig>(&config_yaml)
        .expect("could not parse config file");

    init_logger(&config.logs_filepath);
    info!(
        "Path to config file: {:?}",
        args.config_file.canonicalize().unwrap()
    );

    if let Err(e) = run(&args, config) {
        error!("Simulation setup failed: {}", e);
        std::process::exit(1);
    }
}
