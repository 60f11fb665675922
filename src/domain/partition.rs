use std::collections::HashSet;

use crate::api::partition_dto::PartitionDto;
use crate::domain::job::{JobKey, JobStore};
use crate::domain::utils::id::PartitionId;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSpec {
    pub id: PartitionId,
    pub capacity: u64,
}

impl PartitionSpec {
    pub fn new(id: u64, capacity: u64) -> Self {
        Self { id: PartitionId::new(id), capacity }
    }
}

impl TryFrom<PartitionDto> for PartitionSpec {
    type Error = Error;

    fn try_from(dto: PartitionDto) -> Result<Self> {
        let id = u64::try_from(dto.id).map_err(|_| Error::InvalidConfiguration(format!("Partition id must not be negative, got {}.", dto.id)))?;

        if dto.capacity <= 0 {
            return Err(Error::InvalidConfiguration(format!("Partition {} has non-positive capacity {}.", dto.id, dto.capacity)));
        }

        Ok(PartitionSpec::new(id, dto.capacity as u64))
    }
}

/// A fixed-size memory region. Holds at most one job at a time.
#[derive(Debug, Clone)]
pub struct Partition {
    pub id: PartitionId,
    pub capacity: u64,

    /// Sum of the capacities of all partitions up to and including this one, in input order.
    pub cumulative_offset: u64,

    occupant: Option<JobKey>,

    /// How many jobs have ever been placed here.
    allocation_count: u64,
}

impl Partition {
    pub fn new(spec: &PartitionSpec, cumulative_offset: u64) -> Self {
        Self { id: spec.id, capacity: spec.capacity, cumulative_offset, occupant: None, allocation_count: 0 }
    }

    /// First address covered by this partition.
    pub fn start_offset(&self) -> u64 {
        self.cumulative_offset - self.capacity
    }

    pub fn is_available(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn occupant(&self) -> Option<JobKey> {
        self.occupant
    }

    pub fn allocation_count(&self) -> u64 {
        self.allocation_count
    }

    pub fn is_never_used(&self) -> bool {
        self.allocation_count == 0
    }

    pub fn is_heavily_used(&self) -> bool {
        self.allocation_count > 1
    }

    pub fn occupy(&mut self, job: JobKey) {
        debug_assert!(self.occupant.is_none(), "Partition {} is already occupied", self.id);
        self.occupant = Some(job);
        self.allocation_count += 1;
    }

    pub fn release(&mut self) -> Option<JobKey> {
        self.occupant.take()
    }

    /// Unused capacity inside the partition; `0` while it is free.
    pub fn internal_fragmentation(&self, jobs: &JobStore) -> u64 {
        match self.occupant {
            Some(key) => self.capacity - jobs[key].size,
            None => 0,
        }
    }
}

/// Builds the partitions in input order and assigns their cumulative offsets.
///
/// Fails on a zero capacity, a repeated partition id, or a total capacity
/// that does not fit in a `u64`.
pub fn layout(specs: &[PartitionSpec]) -> Result<Vec<Partition>> {
    let mut seen = HashSet::new();
    let mut cumulative_offset: u64 = 0;
    let mut partitions = Vec::with_capacity(specs.len());

    for spec in specs {
        if spec.capacity == 0 {
            return Err(Error::InvalidConfiguration(format!("Partition {} has zero capacity.", spec.id)));
        }
        if !seen.insert(spec.id) {
            return Err(Error::InvalidConfiguration(format!("Duplicate partition id {}.", spec.id)));
        }

        cumulative_offset = cumulative_offset
            .checked_add(spec.capacity)
            .ok_or_else(|| Error::InvalidConfiguration(format!("Total partition capacity overflows at partition {}.", spec.id)))?;
        partitions.push(Partition::new(spec, cumulative_offset));
    }

    Ok(partitions)
}
