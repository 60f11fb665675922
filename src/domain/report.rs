use serde::Serialize;

use crate::domain::job::Ticks;
use crate::domain::metrics::MetricsSummary;
use crate::domain::placement_policy::PlacementPolicy;
use crate::domain::utils::id::{JobId, PartitionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedJob {
    pub id: JobId,
    pub size: u64,
    pub execution_time: Ticks,
    pub admitted_at: Ticks,
    pub completed_at: Ticks,
    pub waiting_time: Ticks,
    pub turnaround: Ticks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionUsage {
    pub id: PartitionId,
    pub capacity: u64,
    pub allocation_count: u64,
}

/// Everything a driver needs to print after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub policy: PlacementPolicy,

    /// `false` if the report was taken before the run terminated.
    pub terminated: bool,
    pub ticks_elapsed: Ticks,
    pub metrics: MetricsSummary,

    /// In completion order.
    pub completed_jobs: Vec<CompletedJob>,

    /// Jobs larger than every partition, ascending by id. They never leave the queue.
    pub stranded_jobs: Vec<JobId>,

    /// In input order.
    pub partition_usage: Vec<PartitionUsage>,
}

impl FinalReport {
    pub fn avg_turnaround(&self) -> f64 {
        if self.completed_jobs.is_empty() {
            return 0.0;
        }
        self.completed_jobs.iter().map(|j| j.turnaround as f64).sum::<f64>() / self.completed_jobs.len() as f64
    }

    pub fn has_stranded_jobs(&self) -> bool {
        !self.stranded_jobs.is_empty()
    }
}
