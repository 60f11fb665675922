use bimap::BiMap;
use serde::Serialize;
use slotmap::{SlotMap, new_key_type};
use std::ops::{Index, IndexMut};

use crate::api::job_dto::JobDto;
use crate::domain::utils::id::{JobId, PartitionId};
use crate::error::{Error, Result};

new_key_type! {
    /// Handle into the simulator's job arena. Partitions and the waiting queue
    /// only ever hold these, never the job itself.
    pub struct JobKey;
}

/// The unit of simulated time.
pub type Ticks = u64;

/// Validated description of a job, as handed to [`Simulator::new`](crate::domain::simulator::Simulator::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSpec {
    pub id: JobId,
    pub execution_time: Ticks,
    pub size: u64,
}

impl JobSpec {
    pub fn new(id: u64, execution_time: Ticks, size: u64) -> Self {
        Self { id: JobId::new(id), execution_time, size }
    }
}

impl TryFrom<JobDto> for JobSpec {
    type Error = Error;

    fn try_from(dto: JobDto) -> Result<Self> {
        let id = u64::try_from(dto.id).map_err(|_| Error::InvalidConfiguration(format!("Job id must not be negative, got {}.", dto.id)))?;

        if dto.execution_time <= 0 {
            return Err(Error::InvalidConfiguration(format!("Job {} has non-positive execution time {}.", dto.id, dto.execution_time)));
        }
        if dto.size <= 0 {
            return Err(Error::InvalidConfiguration(format!("Job {} has non-positive size {}.", dto.id, dto.size)));
        }

        Ok(JobSpec::new(id, dto.execution_time as Ticks, dto.size as u64))
    }
}

/// Where a job currently lives. A job is in exactly one of these at any tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobState {
    Queued,
    Running { partition: PartitionId },
    Completed,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub size: u64,
    pub execution_time: Ticks,
    pub remaining_time: Ticks,
    pub waiting_time: Ticks,
    pub state: JobState,
    pub admitted_at: Option<Ticks>,
    pub completed_at: Option<Ticks>,
}

impl Job {
    pub fn new(spec: &JobSpec) -> Self {
        Self {
            id: spec.id,
            size: spec.size,
            execution_time: spec.execution_time,
            remaining_time: spec.execution_time,
            waiting_time: 0,
            state: JobState::Queued,
            admitted_at: None,
            completed_at: None,
        }
    }

    pub fn fits_in(&self, capacity: u64) -> bool {
        self.size <= capacity
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_time == 0
    }

    pub fn is_queued(&self) -> bool {
        self.state == JobState::Queued
    }

    /// Called by the admission scan once the job owns `partition`.
    pub fn start(&mut self, partition: PartitionId, now: Ticks) {
        debug_assert!(self.is_queued(), "Job {} must be queued before it is admitted", self.id);
        self.state = JobState::Running { partition };
        self.admitted_at = Some(now);
    }

    /// One tick of execution.
    pub fn decrement(&mut self) {
        debug_assert!(matches!(self.state, JobState::Running { .. }), "Only running jobs consume execution time (job {})", self.id);
        self.remaining_time = self.remaining_time.saturating_sub(1);
    }

    /// One tick spent in the waiting queue.
    pub fn age(&mut self) {
        debug_assert!(self.is_queued(), "Only queued jobs accumulate waiting time (job {})", self.id);
        self.waiting_time += 1;
    }

    pub fn complete(&mut self, now: Ticks) {
        debug_assert!(self.is_complete(), "Job {} completed with {} ticks left", self.id, self.remaining_time);
        self.state = JobState::Completed;
        self.completed_at = Some(now);
    }

    /// Ticks from simulation start (every job arrives at tick 0) until the job freed its partition.
    pub fn turnaround(&self) -> Option<Ticks> {
        self.completed_at
    }
}

/// Arena owning every job of a run.
///
/// Jobs are never removed, so a [`JobKey`] handed out once stays valid for the
/// whole run; completed jobs are kept for the final report.
#[derive(Debug)]
pub struct JobStore {
    jobs: SlotMap<JobKey, Job>,

    /// Lookup between the external job id and the internal arena key.
    index: BiMap<JobId, JobKey>,
}

impl JobStore {
    pub fn new() -> Self {
        Self { jobs: SlotMap::with_key(), index: BiMap::new() }
    }

    /// Adds a job to the arena.
    ///
    /// # Returns
    /// The arena key, or `Error::InvalidConfiguration` if a job with the same id was already added.
    pub fn insert(&mut self, job: Job) -> Result<JobKey> {
        if self.index.contains_left(&job.id) {
            return Err(Error::InvalidConfiguration(format!("Duplicate job id {}.", job.id)));
        }

        let id = job.id;
        let key = self.jobs.insert(job);
        self.index.insert(id, key);

        Ok(key)
    }

    pub fn get(&self, key: JobKey) -> Option<&Job> {
        self.jobs.get(key)
    }

    pub fn key_of(&self, id: JobId) -> Option<JobKey> {
        self.index.get_by_left(&id).copied()
    }

    pub fn get_by_id(&self, id: JobId) -> Option<&Job> {
        self.key_of(id).and_then(|key| self.jobs.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobKey, &Job)> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<JobKey> for JobStore {
    type Output = Job;

    fn index(&self, key: JobKey) -> &Job {
        &self.jobs[key]
    }
}

impl IndexMut<JobKey> for JobStore {
    fn index_mut(&mut self, key: JobKey) -> &mut Job {
        &mut self.jobs[key]
    }
}
