use serde::Serialize;

use crate::domain::job::{JobStore, Ticks};
use crate::domain::partition::Partition;
use crate::domain::utils::id::{JobId, PartitionId};
use crate::domain::waiting_queue::WaitingQueue;

/// One job placed into one partition by an admission scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub job: JobId,
    pub partition: PartitionId,
    pub tick: Ticks,
}

/// Greedy admission pass over the partitions in policy order.
pub struct AdmissionScanner;

impl AdmissionScanner {
    /// Fills as many free partitions as possible from the front of `queue`.
    ///
    /// `order` holds indices into `partitions` as produced by
    /// [`PlacementPolicy::order`](crate::domain::placement_policy::PlacementPolicy::order).
    ///
    /// At each free partition only the front-of-queue job is tried. A job that
    /// is too large is moved to the back of the queue and the same partition is
    /// offered to the new front; the partition is skipped outright when no
    /// queued job fits it, so the rotation always ends in an admission.
    /// After every admission the queue is sorted by job id again.
    ///
    /// # Returns
    /// The admissions made, in the order they happened.
    pub fn scan(order: &[usize], partitions: &mut [Partition], queue: &mut WaitingQueue, jobs: &mut JobStore, now: Ticks) -> Vec<Admission> {
        let mut admissions = Vec::new();
        let mut cursor = 0;

        while cursor < order.len() {
            if partitions.iter().all(|p| !p.is_available()) {
                break;
            }

            let partition = &mut partitions[order[cursor]];

            if !partition.is_available() || !queue.any_fits(partition.capacity, jobs) {
                cursor += 1;
                continue;
            }

            let Some(key) = queue.pop_front() else {
                break;
            };

            if jobs[key].fits_in(partition.capacity) {
                partition.occupy(key);
                jobs[key].start(partition.id, now);
                admissions.push(Admission { job: jobs[key].id, partition: partition.id, tick: now });

                cursor += 1;
                queue.sort_by_identity(jobs);
            } else {
                // Requeue and retry this partition with the next job.
                queue.push_back(key);
            }
        }

        queue.sort_by_identity(jobs);
        admissions
    }
}
