use serde::Serialize;

use crate::domain::job::Ticks;
use crate::domain::metrics::TickMetrics;
use crate::domain::placement_policy::PlacementPolicy;
use crate::domain::utils::id::{JobId, PartitionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantView {
    pub job: JobId,
    pub size: u64,
    pub remaining_time: Ticks,
}

/// One row of the memory chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionView {
    pub id: PartitionId,
    pub capacity: u64,
    pub start_offset: u64,
    pub cumulative_offset: u64,
    pub allocation_count: u64,
    pub occupant: Option<OccupantView>,
    pub internal_fragmentation: u64,
}

/// State of the run at the top of a tick, as handed to drivers and observers.
/// Partitions are listed in input order regardless of the placement policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSnapshot {
    pub tick: Ticks,
    pub policy: PlacementPolicy,
    pub metrics: TickMetrics,
    pub partitions: Vec<PartitionView>,
    pub queue: Vec<JobId>,
}

/// Receives every snapshot of a run, e.g. to render or export it.
pub trait TickObserver {
    fn on_tick(&mut self, snapshot: &TickSnapshot);
}

impl<F: FnMut(&TickSnapshot)> TickObserver for F {
    fn on_tick(&mut self, snapshot: &TickSnapshot) {
        self(snapshot)
    }
}
