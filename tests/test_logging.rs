use fixed_partition_sim::domain::{job::JobSpec, partition::PartitionSpec, placement_policy::PlacementPolicy, simulator::Simulator};

// logtest installs a process-wide logger, so this file holds a single test.
#[test]
fn test_simulator_logs_stranded_jobs_and_termination() {
    let mut logger = logtest::Logger::start();

    let mut simulator = Simulator::new(
        vec![JobSpec::new(1, 1, 5), JobSpec::new(2, 1, 500)],
        vec![PartitionSpec::new(1, 10)],
        PlacementPolicy::FirstFit,
    )
    .unwrap();
    simulator.run_to_completion();

    let mut records = Vec::new();
    while let Some(record) = logger.pop() {
        records.push((record.level(), record.args().to_string()));
    }

    assert!(records.iter().any(|(level, msg)| *level == log::Level::Warn && msg.contains("Job 2") && msg.contains("will stay queued")));
    assert!(records.iter().any(|(level, msg)| *level == log::Level::Info && msg.contains("terminated") && msg.contains("1 stranded")));
}
