use crate::api::simulation_dto::SimulationConfigDto;
use crate::domain::job::JobSpec;
use crate::domain::partition::PartitionSpec;
use crate::domain::placement_policy::PlacementPolicy;
use crate::domain::simulator::Simulator;
use crate::error::Result;
use crate::loader::parser::load_config;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;
pub mod presentation;

pub use crate::domain::report::FinalReport;
pub use crate::domain::snapshot::TickSnapshot;

/// Validates the DTOs of a JSON configuration and builds the simulator it describes.
pub fn simulator_from_config(config: SimulationConfigDto) -> Result<Simulator> {
    let policy: PlacementPolicy = config.policy.parse()?;

    let jobs = config.jobs.into_iter().map(JobSpec::try_from).collect::<Result<Vec<_>>>()?;
    let partitions = config.partitions.into_iter().map(PartitionSpec::try_from).collect::<Result<Vec<_>>>()?;

    Simulator::new(jobs, partitions, policy)
}

/// Loads a JSON configuration file and builds its simulator.
///
/// Returns the simulator together with the statistics file named in the
/// configuration, if any. The caller is expected to have initialized the logger.
pub fn build_simulator_from_config(file_path: &str) -> Result<(Simulator, Option<String>)> {
    let config = load_config(file_path)?;
    let stats_file = config.stats_file.clone();

    let simulator = simulator_from_config(config)?;
    log::info!("Simulator for '{}' constructed successfully.", file_path);

    Ok((simulator, stats_file))
}
