use std::collections::VecDeque;

use crate::domain::job::{JobKey, JobStore};

/// Jobs that have not been admitted yet, front first.
#[derive(Debug, Clone, Default)]
pub struct WaitingQueue {
    jobs: VecDeque<JobKey>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self { jobs: VecDeque::new() }
    }

    pub fn push_back(&mut self, job: JobKey) {
        self.jobs.push_back(job);
    }

    pub fn pop_front(&mut self) -> Option<JobKey> {
        self.jobs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, job: JobKey) -> bool {
        self.jobs.contains(&job)
    }

    pub fn iter(&self) -> impl Iterator<Item = JobKey> + '_ {
        self.jobs.iter().copied()
    }

    /// Returns `true` if at least one queued job is small enough for `capacity`.
    pub fn any_fits(&self, capacity: u64, jobs: &JobStore) -> bool {
        self.jobs.iter().any(|&key| jobs[key].fits_in(capacity))
    }

    /// Restores ascending job-id order.
    pub fn sort_by_identity(&mut self, jobs: &JobStore) {
        self.jobs.make_contiguous().sort_by_key(|&key| jobs[key].id);
    }

    pub fn is_sorted_by_identity(&self, jobs: &JobStore) -> bool {
        self.jobs.iter().zip(self.jobs.iter().skip(1)).all(|(&a, &b)| jobs[a].id <= jobs[b].id)
    }
}
