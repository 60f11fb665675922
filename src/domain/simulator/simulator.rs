use serde::Serialize;

use crate::domain::{
    admission::AdmissionScanner,
    clock::Clock,
    job::{Job, JobKey, JobSpec, JobState, JobStore, Ticks},
    metrics::{MetricsCollector, TickMetrics},
    partition::{self, Partition, PartitionSpec},
    placement_policy::PlacementPolicy,
    report::{CompletedJob, FinalReport, PartitionUsage},
    snapshot::{OccupantView, PartitionView, TickObserver, TickSnapshot},
    utils::id::{JobId, PartitionId},
    waiting_queue::WaitingQueue,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationState {
    /// A partition is occupied or a queued job can still be placed.
    Running,
    Terminated,
}

/// One fixed-partition simulation run under a single placement policy.
///
/// The simulator owns every job, partition and the waiting queue. It never
/// blocks: the driver calls [`step`](Simulator::step) at whatever pace it likes
/// and may stop between any two ticks.
#[derive(Debug)]
pub struct Simulator {
    policy: PlacementPolicy,
    jobs: JobStore,

    /// In input order.
    partitions: Vec<Partition>,

    /// Indices into `partitions`, computed once from the policy.
    policy_order: Vec<usize>,
    queue: WaitingQueue,
    clock: Clock,
    metrics: MetricsCollector,

    /// Largest partition capacity; jobs above it are stranded.
    max_capacity: u64,
    completion_order: Vec<JobKey>,
    state: SimulationState,
}

impl Simulator {
    /// Builds the run and performs the initial admission scan.
    ///
    /// Jobs are queued in ascending id order whatever order they are given in.
    ///
    /// # Errors
    /// `Error::InvalidConfiguration` for a zero size, capacity or execution
    /// time, or for a repeated job or partition id.
    pub fn new(mut job_specs: Vec<JobSpec>, partition_specs: Vec<PartitionSpec>, policy: PlacementPolicy) -> Result<Self> {
        let partitions = partition::layout(&partition_specs)?;
        let policy_order = policy.order(&partitions);
        let max_capacity = partitions.iter().map(|p| p.capacity).max().unwrap_or(0);

        job_specs.sort_by_key(|spec| spec.id);

        let mut jobs = JobStore::new();
        let mut queue = WaitingQueue::new();

        for spec in &job_specs {
            if spec.size == 0 {
                return Err(Error::InvalidConfiguration(format!("Job {} has zero size.", spec.id)));
            }
            if spec.execution_time == 0 {
                return Err(Error::InvalidConfiguration(format!("Job {} has zero execution time.", spec.id)));
            }

            let key = jobs.insert(Job::new(spec))?;
            queue.push_back(key);

            if spec.size > max_capacity {
                log::warn!("Job {} (size {}) is larger than every partition (max {}) and will stay queued.", spec.id, spec.size, max_capacity);
            }
        }

        log::info!(
            "Simulator created: policy {}, {} jobs, {} partitions (total capacity {}).",
            policy,
            jobs.len(),
            partitions.len(),
            partitions.last().map(|p| p.cumulative_offset).unwrap_or(0)
        );

        let mut simulator = Simulator {
            policy,
            jobs,
            partitions,
            policy_order,
            queue,
            clock: Clock::new(),
            metrics: MetricsCollector::new(),
            max_capacity,
            completion_order: Vec::new(),
            state: SimulationState::Running,
        };

        simulator.admit();
        if simulator.is_terminated() {
            simulator.terminate();
        }

        Ok(simulator)
    }

    /// Runs the admission scan and logs what it placed.
    fn admit(&mut self) {
        let admissions = AdmissionScanner::scan(&self.policy_order, &mut self.partitions, &mut self.queue, &mut self.jobs, self.clock.now());

        for admission in admissions {
            log::debug!("t={} admitted job {} into partition {}.", admission.tick, admission.job, admission.partition);
        }
    }

    fn terminate(&mut self) {
        self.state = SimulationState::Terminated;
        log::info!(
            "Simulation ({}) terminated at t={}: {} jobs completed, {} stranded.",
            self.policy,
            self.clock.now(),
            self.completion_order.len(),
            self.stranded_job_ids().len()
        );
    }

    fn is_occupied(&self) -> bool {
        self.partitions.iter().any(|p| !p.is_available())
    }

    fn is_job_allocatable(&self) -> bool {
        self.partitions.iter().any(|p| self.queue.any_fits(p.capacity, &self.jobs))
    }

    /// `true` once no partition is occupied and no queued job fits any partition.
    pub fn is_terminated(&self) -> bool {
        !self.is_occupied() && !self.is_job_allocatable()
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Advances the run by one tick.
    ///
    /// The returned snapshot describes the state at the top of the tick, the
    /// same state its metrics were measured from.
    ///
    /// # Returns
    /// `None` once the run has terminated; the clock no longer moves then.
    pub fn step(&mut self) -> Option<TickSnapshot> {
        if self.is_terminated() {
            if self.state == SimulationState::Running {
                self.terminate();
            }
            return None;
        }

        let now = self.clock.now();
        let metrics = TickMetrics::measure(now, &self.partitions, &self.queue, &self.jobs, self.max_capacity);
        let snapshot = self.snapshot(metrics.clone());
        self.metrics.record(metrics);

        for position in 0..self.policy_order.len() {
            let index = self.policy_order[position];
            let Some(key) = self.partitions[index].occupant() else {
                continue;
            };

            if self.jobs[key].is_complete() {
                self.partitions[index].release();
                self.jobs[key].complete(now);
                self.completion_order.push(key);
                log::debug!("t={} job {} completed, partition {} is free.", now, self.jobs[key].id, self.partitions[index].id);

                // A freed partition may take a queued job within the same tick.
                self.admit();
            } else {
                self.jobs[key].decrement();
            }
        }

        for key in self.queue.iter() {
            self.jobs[key].age();
        }

        self.check_invariants();
        self.clock.up();

        log::trace!(
            "t={} throughput {} fragmentation {} valid queue {}.",
            now,
            snapshot.metrics.throughput,
            snapshot.metrics.internal_fragmentation,
            snapshot.metrics.valid_queue_length
        );

        Some(snapshot)
    }

    /// Steps until termination and returns the final report.
    pub fn run_to_completion(&mut self) -> FinalReport {
        while self.step().is_some() {}
        self.final_report()
    }

    /// Like [`run_to_completion`](Simulator::run_to_completion), handing every snapshot to `observer`.
    pub fn run_with_observer(&mut self, observer: &mut dyn TickObserver) -> FinalReport {
        while let Some(snapshot) = self.step() {
            observer.on_tick(&snapshot);
        }
        self.final_report()
    }

    /// Lazily steps the run; the iterator ends when the simulator terminates.
    pub fn snapshots(&mut self) -> impl Iterator<Item = TickSnapshot> + '_ {
        std::iter::from_fn(move || self.step())
    }

    fn snapshot(&self, metrics: TickMetrics) -> TickSnapshot {
        let partitions = self
            .partitions
            .iter()
            .map(|p| PartitionView {
                id: p.id,
                capacity: p.capacity,
                start_offset: p.start_offset(),
                cumulative_offset: p.cumulative_offset,
                allocation_count: p.allocation_count(),
                occupant: p.occupant().map(|key| {
                    let job = &self.jobs[key];
                    OccupantView { job: job.id, size: job.size, remaining_time: job.remaining_time }
                }),
                internal_fragmentation: p.internal_fragmentation(&self.jobs),
            })
            .collect();

        TickSnapshot { tick: metrics.tick, policy: self.policy, metrics, partitions, queue: self.queued_job_ids() }
    }

    /// The aggregates of all ticks recorded so far.
    pub fn final_report(&self) -> FinalReport {
        let completed_jobs = self
            .completion_order
            .iter()
            .map(|&key| {
                let job = &self.jobs[key];
                // Completed jobs always carry both timestamps.
                let admitted_at = job.admitted_at.unwrap_or_default();
                let completed_at = job.completed_at.unwrap_or_default();
                CompletedJob {
                    id: job.id,
                    size: job.size,
                    execution_time: job.execution_time,
                    admitted_at,
                    completed_at,
                    waiting_time: job.waiting_time,
                    turnaround: job.turnaround().unwrap_or_default(),
                }
            })
            .collect();

        let partition_usage = self
            .partitions
            .iter()
            .map(|p| PartitionUsage { id: p.id, capacity: p.capacity, allocation_count: p.allocation_count() })
            .collect();

        FinalReport {
            policy: self.policy,
            terminated: self.is_terminated(),
            ticks_elapsed: self.clock.now(),
            metrics: self.metrics.summary(),
            completed_jobs,
            stranded_jobs: self.stranded_job_ids(),
            partition_usage,
        }
    }

    /// Queued jobs that fit no partition, ascending by id.
    pub fn stranded_job_ids(&self) -> Vec<JobId> {
        self.queue.iter().map(|key| &self.jobs[key]).filter(|job| !job.fits_in(self.max_capacity)).map(|job| job.id).collect()
    }

    pub fn queued_job_ids(&self) -> Vec<JobId> {
        self.queue.iter().map(|key| self.jobs[key].id).collect()
    }

    pub fn now(&self) -> Ticks {
        self.clock.now()
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Partitions in input order.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Partition ids in the order the admission scan visits them.
    pub fn policy_order(&self) -> Vec<PartitionId> {
        self.policy_order.iter().map(|&i| self.partitions[i].id).collect()
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get_by_id(id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().map(|(_, job)| job)
    }

    /// Consistency checks at the tick boundary; compiled out of release builds.
    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }

        for partition in &self.partitions {
            if let Some(key) = partition.occupant() {
                let job = &self.jobs[key];
                debug_assert!(job.size <= partition.capacity, "Job {} (size {}) exceeds partition {} (capacity {})", job.id, job.size, partition.id, partition.capacity);
                debug_assert_eq!(job.state, JobState::Running { partition: partition.id }, "Occupant {} of partition {} must be running there", job.id, partition.id);
                debug_assert!(!self.queue.contains(key), "Running job {} must not be queued", job.id);
            }
        }

        for key in self.queue.iter() {
            debug_assert_eq!(self.jobs[key].state, JobState::Queued, "Queued job {} must be in state Queued", self.jobs[key].id);
        }

        debug_assert!(self.queue.is_sorted_by_identity(&self.jobs), "Waiting queue must be sorted by job id");
    }
}
