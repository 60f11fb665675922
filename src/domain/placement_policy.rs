use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::partition::Partition;
use crate::error::Error;

/// Decides the order in which free partitions are offered to the waiting queue.
///
/// The policy is nothing but a sort key over the partitions: it never touches
/// partition identity, offsets or occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    /// Partitions in input order.
    FirstFit,
    /// Smallest capacity first.
    BestFit,
    /// Largest capacity first.
    WorstFit,
}

impl PlacementPolicy {
    pub const ALL: [PlacementPolicy; 3] = [PlacementPolicy::FirstFit, PlacementPolicy::BestFit, PlacementPolicy::WorstFit];

    pub fn name(&self) -> &'static str {
        match self {
            PlacementPolicy::FirstFit => "first-fit",
            PlacementPolicy::BestFit => "best-fit",
            PlacementPolicy::WorstFit => "worst-fit",
        }
    }

    /// Compares two partitions by capacity under this policy.
    ///
    /// Returns `Ordering::Less` if `a` should be offered before `b`.
    ///
    /// Note: partitions of equal capacity (and every pair under First-Fit) are
    ///       compared by their input position, so the resulting order is total.
    pub fn compare(&self, a: (usize, &Partition), b: (usize, &Partition)) -> Ordering {
        let by_capacity = match self {
            PlacementPolicy::FirstFit => Ordering::Equal,
            PlacementPolicy::BestFit => a.1.capacity.cmp(&b.1.capacity),
            PlacementPolicy::WorstFit => b.1.capacity.cmp(&a.1.capacity),
        };

        match by_capacity {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        }
    }

    /// Indices into `partitions` (which must be in input order) in the order
    /// the admission scan should visit them.
    pub fn order(&self, partitions: &[Partition]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..partitions.len()).collect();
        order.sort_by(|&a, &b| self.compare((a, &partitions[a]), (b, &partitions[b])));
        order
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PlacementPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase();

        match normalized.as_str() {
            "firstfit" | "first" | "ff" => Ok(PlacementPolicy::FirstFit),
            "bestfit" | "best" | "bf" => Ok(PlacementPolicy::BestFit),
            "worstfit" | "worst" | "wf" => Ok(PlacementPolicy::WorstFit),
            _ => Err(Error::UnknownPlacementPolicy(s.to_string())),
        }
    }
}
