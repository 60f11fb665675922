use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::job::{JobSpec, Ticks};
use crate::domain::partition::PartitionSpec;
use crate::error::{Error, Result};

/// Shape of a generated workload. All ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadParams {
    pub job_count: usize,
    pub partition_count: usize,
    pub execution_time: (Ticks, Ticks),
    pub job_size: (u64, u64),
    pub partition_capacity: (u64, u64),
}

impl Default for WorkloadParams {
    fn default() -> Self {
        WorkloadParams { job_count: 25, partition_count: 10, execution_time: (1, 10), job_size: (100, 9000), partition_capacity: (1000, 10000) }
    }
}

impl WorkloadParams {
    fn validate(&self) -> Result<()> {
        let ranges = [("execution time", self.execution_time), ("job size", self.job_size), ("partition capacity", self.partition_capacity)];

        for (name, (low, high)) in ranges {
            if low == 0 {
                return Err(Error::InvalidConfiguration(format!("The {} range must start above zero.", name)));
            }
            if low > high {
                return Err(Error::InvalidConfiguration(format!("The {} range {}..={} is empty.", name, low, high)));
            }
        }

        Ok(())
    }
}

/// Draws a reproducible workload: the same seed and parameters always give
/// the same jobs and partitions. Ids are assigned from 1 upwards.
///
/// Nothing prevents a job from being larger than every partition; such jobs are
/// simply stranded in the run.
pub fn random_workload(seed: u64, params: &WorkloadParams) -> Result<(Vec<JobSpec>, Vec<PartitionSpec>)> {
    params.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);

    let partitions = (1..=params.partition_count as u64)
        .map(|id| PartitionSpec::new(id, rng.random_range(params.partition_capacity.0..=params.partition_capacity.1)))
        .collect();

    let jobs = (1..=params.job_count as u64)
        .map(|id| {
            let execution_time = rng.random_range(params.execution_time.0..=params.execution_time.1);
            let size = rng.random_range(params.job_size.0..=params.job_size.1);
            JobSpec::new(id, execution_time, size)
        })
        .collect();

    log::debug!("Generated workload with seed {}: {} jobs, {} partitions.", seed, params.job_count, params.partition_count);

    Ok((jobs, partitions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_workload() {
        let params = WorkloadParams::default();
        assert_eq!(random_workload(7, &params).unwrap(), random_workload(7, &params).unwrap());
    }

    #[test]
    fn test_values_stay_in_range() {
        let params = WorkloadParams { job_count: 200, partition_count: 50, execution_time: (2, 4), job_size: (10, 20), partition_capacity: (15, 15) };
        let (jobs, partitions) = random_workload(42, &params).unwrap();

        assert_eq!(jobs.len(), 200);
        assert_eq!(partitions.len(), 50);
        assert!(jobs.iter().all(|j| (2..=4).contains(&j.execution_time) && (10..=20).contains(&j.size)));
        assert!(partitions.iter().all(|p| p.capacity == 15));
        assert_eq!(jobs.last().map(|j| j.id.id), Some(200));
    }

    #[test]
    fn test_rejects_empty_or_zero_ranges() {
        let empty = WorkloadParams { job_size: (20, 10), ..WorkloadParams::default() };
        let zero = WorkloadParams { execution_time: (0, 3), ..WorkloadParams::default() };

        assert!(matches!(random_workload(1, &empty), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(random_workload(1, &zero), Err(Error::InvalidConfiguration(_))));
    }
}
