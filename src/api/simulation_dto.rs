use serde::{Deserialize, Serialize};

use crate::api::{job_dto::JobDto, partition_dto::PartitionDto};

fn default_policy() -> String {
    "first-fit".to_string()
}

/// A complete simulation run described in a single JSON document.
///
/// ```json
/// {
///   "policy": "best-fit",
///   "statsFile": "best_fit.csv",
///   "jobs": [{ "id": 1, "executionTime": 5, "size": 120 }],
///   "partitions": [{ "id": 1, "capacity": 200 }]
/// }
/// ```
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfigDto {
    #[serde(default = "default_policy")]
    pub policy: String,
    #[serde(default)]
    pub stats_file: Option<String>,
    pub jobs: Vec<JobDto>,
    pub partitions: Vec<PartitionDto>,
}
