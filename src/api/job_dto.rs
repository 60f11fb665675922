use serde::{Deserialize, Serialize};

/// One row of the job workload table.
///
/// Fields are signed on purpose: a negative time or size must reach validation
/// and be reported as an invalid configuration instead of a parse failure.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    #[serde(alias = "job_id")]
    pub id: i64,
    #[serde(alias = "execution_time", alias = "time")]
    pub execution_time: i64,
    pub size: i64,
}
