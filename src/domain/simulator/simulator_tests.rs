/// Unit tests for the tick loop in `simulator.rs`.
///
/// The scenarios are small enough to follow by hand; each comment states the
/// expected timeline. The integration tests in `tests/` cover larger workloads
/// through the public API.
#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::domain::{
        job::{JobSpec, JobState},
        partition::PartitionSpec,
        placement_policy::PlacementPolicy,
        simulator::{SimulationState, Simulator},
        snapshot::TickSnapshot,
        utils::id::{JobId, PartitionId},
    };
    use crate::error::Error;

    // --- HELPER FUNCTIONS FOR TEST SETUP ---

    fn jobs(rows: &[(u64, u64, u64)]) -> Vec<JobSpec> {
        rows.iter().map(|&(id, time, size)| JobSpec::new(id, time, size)).collect()
    }

    fn partitions(rows: &[(u64, u64)]) -> Vec<PartitionSpec> {
        rows.iter().map(|&(id, capacity)| PartitionSpec::new(id, capacity)).collect()
    }

    fn collect_snapshots(simulator: &mut Simulator) -> Vec<TickSnapshot> {
        simulator.snapshots().collect()
    }

    // --- TIMELINE TESTS ---

    #[test]
    fn test_two_jobs_two_partitions_timeline() {
        // t0: both admitted, fragmentation (20-15)+(10-5) = 10
        // t1: job 2 reached 0 during t0 and is freed now
        // t2: job 1 is freed
        // t3: nothing left, terminated
        let mut simulator = Simulator::new(jobs(&[(1, 2, 15), (2, 1, 5)]), partitions(&[(1, 20), (2, 10)]), PlacementPolicy::FirstFit).unwrap();
        assert!(simulator.queued_job_ids().is_empty());

        let snapshots = collect_snapshots(&mut simulator);
        let throughput: Vec<u64> = snapshots.iter().map(|s| s.metrics.throughput).collect();
        let fragmentation: Vec<u64> = snapshots.iter().map(|s| s.metrics.internal_fragmentation).collect();

        assert_eq!(throughput, vec![2, 2, 1]);
        assert_eq!(fragmentation, vec![10, 10, 5]);
        assert!(snapshots.iter().all(|s| s.queue.is_empty()));

        assert!(simulator.is_terminated());
        assert_eq!(simulator.state(), SimulationState::Terminated);
        assert_eq!(simulator.now(), 3);

        let report = simulator.final_report();
        assert!(report.terminated);
        assert_eq!(report.metrics.ticks_recorded, 3);
        assert_eq!(report.metrics.total_fragmentation, 25);
        assert_eq!(report.completed_jobs.iter().map(|j| (j.id.id, j.completed_at)).collect::<Vec<_>>(), vec![(2, 1), (1, 2)]);
        assert!(report.stranded_jobs.is_empty());
    }

    #[test]
    fn test_freed_partition_is_refilled_in_same_tick() {
        let mut simulator = Simulator::new(jobs(&[(1, 1, 10), (2, 1, 10)]), partitions(&[(1, 10)]), PlacementPolicy::FirstFit).unwrap();

        let snapshots = collect_snapshots(&mut simulator);
        let job2 = simulator.job(JobId::new(2)).unwrap();

        // Job 2 waited through t0 only and took the partition at t1.
        assert_eq!(job2.admitted_at, Some(1));
        assert_eq!(job2.waiting_time, 1);
        assert_eq!(job2.completed_at, Some(3));

        assert_eq!(snapshots[1].partitions[0].occupant.map(|o| o.job), Some(JobId::new(1)));
        assert_eq!(snapshots[2].partitions[0].occupant.map(|o| o.job), Some(JobId::new(2)));
        assert_eq!(snapshots[2].metrics.heavily_used_count, 1);
        assert_eq!(snapshots[0].metrics.valid_queue_length, 1);
    }

    #[test]
    fn test_refilled_job_starts_running_on_the_next_tick() {
        // Partition 1 comes first and partition 2 (capacity 4) is free all along,
        // but job 2 only fits partition 1. The refill therefore lands in the
        // partition just freed, which the walk has already passed, so job 2 keeps
        // its full execution time through t1.
        let mut simulator = Simulator::new(jobs(&[(1, 1, 10), (2, 2, 8)]), partitions(&[(1, 10), (2, 4)]), PlacementPolicy::FirstFit).unwrap();

        simulator.step();
        simulator.step();
        let job2 = simulator.job(JobId::new(2)).unwrap();
        assert_eq!(job2.state, JobState::Running { partition: PartitionId::new(1) });
        assert_eq!(job2.admitted_at, Some(1));
        assert_eq!(job2.remaining_time, 2);

        simulator.step();
        assert_eq!(simulator.job(JobId::new(2)).unwrap().remaining_time, 1);

        let report = simulator.run_to_completion();
        assert_eq!(simulator.job(JobId::new(2)).unwrap().completed_at, Some(4));
        assert_eq!(report.partition_usage[1].allocation_count, 0);
    }

    #[test]
    fn test_waiting_time_grows_while_queued_and_freezes_after_admission() {
        let mut simulator = Simulator::new(jobs(&[(1, 3, 10), (2, 2, 10)]), partitions(&[(1, 10)]), PlacementPolicy::FirstFit).unwrap();

        let mut previous = 0;
        while let Some(snapshot) = simulator.step() {
            let job2 = simulator.job(JobId::new(2)).unwrap();
            if job2.is_queued() {
                assert_eq!(job2.waiting_time, previous + 1, "t={}", snapshot.tick);
            } else {
                assert_eq!(job2.waiting_time, 3, "t={}", snapshot.tick);
            }
            previous = job2.waiting_time;
        }

        let job2 = simulator.job(JobId::new(2)).unwrap();
        assert_eq!(job2.admitted_at, Some(3));
        assert_eq!(job2.completed_at, Some(6));
        assert_eq!(simulator.now(), 7);
    }

    #[test]
    fn test_policy_decides_partition_of_first_job() {
        let expectations = [(PlacementPolicy::FirstFit, 1), (PlacementPolicy::BestFit, 3), (PlacementPolicy::WorstFit, 1)];

        for (policy, expected) in expectations {
            let simulator = Simulator::new(jobs(&[(1, 4, 15)]), partitions(&[(1, 30), (2, 10), (3, 20)]), policy).unwrap();
            let job = simulator.job(JobId::new(1)).unwrap();

            assert_eq!(job.state, JobState::Running { partition: PartitionId::new(expected) }, "{}", policy);
        }
    }

    #[test]
    fn test_snapshot_lists_partitions_in_input_order() {
        let mut simulator = Simulator::new(jobs(&[(1, 1, 5)]), partitions(&[(1, 30), (2, 10), (3, 20)]), PlacementPolicy::BestFit).unwrap();

        assert_eq!(simulator.policy_order(), vec![PartitionId::new(2), PartitionId::new(3), PartitionId::new(1)]);

        let snapshot = simulator.step().unwrap();
        let ids: Vec<u64> = snapshot.partitions.iter().map(|p| p.id.id).collect();
        let offsets: Vec<(u64, u64)> = snapshot.partitions.iter().map(|p| (p.start_offset, p.cumulative_offset)).collect();

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(offsets, vec![(0, 30), (30, 40), (40, 60)]);
        assert_eq!(snapshot.partitions[1].occupant.map(|o| o.size), Some(5));
    }

    #[test]
    fn test_jobs_are_queued_in_identity_order() {
        let simulator = Simulator::new(jobs(&[(3, 1, 50), (1, 1, 50), (2, 1, 50)]), partitions(&[(1, 10)]), PlacementPolicy::FirstFit).unwrap();

        assert_eq!(simulator.queued_job_ids(), vec![JobId::new(1), JobId::new(2), JobId::new(3)]);
    }

    // --- EDGE CASES ---

    #[test]
    fn test_stranded_job_does_not_block_termination() {
        let mut simulator = Simulator::new(jobs(&[(1, 1, 5), (2, 1, 50)]), partitions(&[(1, 10)]), PlacementPolicy::FirstFit).unwrap();

        let report = simulator.run_to_completion();

        assert!(report.terminated);
        assert_eq!(report.stranded_jobs, vec![JobId::new(2)]);
        assert!(report.has_stranded_jobs());
        assert_eq!(report.completed_jobs.len(), 1);
        assert_eq!(report.metrics.total_queue_length, 0);
        assert_eq!(report.metrics.total_waiting_time, 0);

        let stranded = simulator.job(JobId::new(2)).unwrap();
        assert_eq!(stranded.state, JobState::Queued);
        assert_eq!(stranded.waiting_time, simulator.now());
    }

    #[test]
    fn test_zero_partitions_terminate_immediately() {
        let mut simulator = Simulator::new(jobs(&[(1, 1, 5)]), vec![], PlacementPolicy::WorstFit).unwrap();

        assert!(simulator.is_terminated());
        assert!(simulator.step().is_none());

        let report = simulator.final_report();
        assert_eq!(report.ticks_elapsed, 0);
        assert_eq!(report.metrics.ticks_recorded, 0);
        assert_eq!(report.stranded_jobs, vec![JobId::new(1)]);
    }

    #[test]
    fn test_zero_jobs_terminate_immediately() {
        let mut simulator = Simulator::new(vec![], partitions(&[(1, 10)]), PlacementPolicy::FirstFit).unwrap();

        assert!(simulator.step().is_none());
        assert_eq!(simulator.now(), 0);
        assert!(simulator.final_report().completed_jobs.is_empty());
    }

    #[test]
    fn test_step_after_termination_keeps_clock() {
        let mut simulator = Simulator::new(jobs(&[(1, 1, 5)]), partitions(&[(1, 10)]), PlacementPolicy::FirstFit).unwrap();
        simulator.run_to_completion();
        let now = simulator.now();

        assert!(simulator.step().is_none());
        assert!(simulator.step().is_none());
        assert_eq!(simulator.now(), now);
        assert_eq!(simulator.metrics().len() as u64, now);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let duplicate_job = Simulator::new(jobs(&[(1, 1, 5), (1, 2, 5)]), partitions(&[(1, 10)]), PlacementPolicy::FirstFit);
        let zero_size = Simulator::new(jobs(&[(1, 1, 0)]), partitions(&[(1, 10)]), PlacementPolicy::FirstFit);
        let zero_time = Simulator::new(jobs(&[(1, 0, 5)]), partitions(&[(1, 10)]), PlacementPolicy::FirstFit);
        let duplicate_partition = Simulator::new(jobs(&[(1, 1, 5)]), partitions(&[(1, 10), (1, 20)]), PlacementPolicy::FirstFit);
        let capacity_overflow = Simulator::new(jobs(&[(1, 1, 5)]), partitions(&[(1, i64::MAX as u64), (2, i64::MAX as u64), (3, i64::MAX as u64)]), PlacementPolicy::FirstFit);

        assert!(matches!(duplicate_job, Err(Error::InvalidConfiguration(_))));
        assert!(matches!(zero_size, Err(Error::InvalidConfiguration(_))));
        assert!(matches!(zero_time, Err(Error::InvalidConfiguration(_))));
        assert!(matches!(duplicate_partition, Err(Error::InvalidConfiguration(_))));
        assert!(matches!(capacity_overflow, Err(Error::InvalidConfiguration(_))));
    }

    // --- INVARIANTS OVER A LARGER RUN ---

    #[test]
    fn test_capacity_and_exclusivity_hold_every_tick() {
        let workload = jobs(&[(1, 4, 30), (2, 2, 12), (3, 5, 45), (4, 1, 8), (5, 3, 25), (6, 2, 40), (7, 6, 10), (8, 2, 44), (9, 1, 19)]);
        let layout = partitions(&[(1, 32), (2, 16), (3, 48), (4, 24)]);

        for policy in PlacementPolicy::ALL {
            let mut simulator = Simulator::new(workload.clone(), layout.clone(), policy).unwrap();
            let mut completed_before: HashSet<JobId> = HashSet::new();

            while let Some(snapshot) = simulator.step() {
                let mut seen = HashSet::new();
                let mut occupied_capacity = 0;

                for view in &snapshot.partitions {
                    if let Some(occupant) = view.occupant {
                        assert!(occupant.size <= view.capacity, "{} t={}: capacity exceeded", policy, snapshot.tick);
                        assert!(seen.insert(occupant.job), "{} t={}: job in two places", policy, snapshot.tick);
                        occupied_capacity += view.capacity;
                    }
                }
                for job in &snapshot.queue {
                    assert!(seen.insert(*job), "{} t={}: job both queued and running", policy, snapshot.tick);
                }
                assert!(seen.is_disjoint(&completed_before), "{} t={}: completed job came back", policy, snapshot.tick);
                assert!(snapshot.metrics.internal_fragmentation <= occupied_capacity);

                completed_before = simulator.jobs().filter(|j| j.state == JobState::Completed).map(|j| j.id).collect();
            }

            let report = simulator.final_report();
            let completed: HashSet<JobId> = report.completed_jobs.iter().map(|j| j.id).collect();
            assert_eq!(completed.len(), report.completed_jobs.len(), "{}: job completed twice", policy);
            assert_eq!(completed.len(), workload.len(), "{}: every job fits, so every job completes", policy);
            assert!(simulator.jobs().all(|j| j.remaining_time == 0));
        }
    }

    #[test]
    fn test_observer_sees_every_tick() {
        let mut simulator = Simulator::new(jobs(&[(1, 2, 5), (2, 3, 5), (3, 1, 5)]), partitions(&[(1, 5)]), PlacementPolicy::FirstFit).unwrap();

        let mut ticks = Vec::new();
        let report = simulator.run_with_observer(&mut |snapshot: &TickSnapshot| ticks.push(snapshot.tick));

        assert_eq!(ticks.len() as u64, report.metrics.ticks_recorded);
        assert_eq!(ticks, (0..report.ticks_elapsed).collect::<Vec<_>>());
    }
}
