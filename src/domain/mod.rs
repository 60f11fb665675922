pub mod admission;
pub mod clock;
pub mod job;
pub mod metrics;
pub mod partition;
pub mod placement_policy;
pub mod report;
pub mod simulator;
pub mod snapshot;
pub mod utils;
pub mod waiting_queue;
pub mod workload;
