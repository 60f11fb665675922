use serde::Serialize;

use crate::domain::job::{JobStore, Ticks};
use crate::domain::partition::Partition;
use crate::domain::waiting_queue::WaitingQueue;

/// Everything measured at the top of one tick.
///
/// "Valid" jobs are queued jobs that fit at least one partition. Stranded jobs
/// would otherwise inflate the waiting statistics forever.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickMetrics {
    pub tick: Ticks,

    /// Number of occupied partitions.
    pub throughput: u64,

    /// Share of partitions currently occupied, in percent.
    pub used_percent: f64,

    /// Share of partitions that were never occupied so far, in percent.
    pub never_used_percent: f64,

    /// Partitions occupied more than once so far.
    pub heavily_used_count: u64,
    pub heavily_used_percent: f64,

    /// Sum of `capacity - occupant.size` over occupied partitions.
    pub internal_fragmentation: u64,

    /// Sum of waiting time over valid queued jobs.
    pub valid_waiting_time: u64,
    pub valid_queue_length: u64,
}

fn percent(count: u64, total: usize) -> f64 {
    if total == 0 { 0.0 } else { count as f64 * 100.0 / total as f64 }
}

impl TickMetrics {
    /// Measures the current state from scratch. `max_capacity` is the largest
    /// partition capacity of the run (0 without partitions).
    pub fn measure(tick: Ticks, partitions: &[Partition], queue: &WaitingQueue, jobs: &JobStore, max_capacity: u64) -> Self {
        let total = partitions.len();

        let throughput = partitions.iter().filter(|p| !p.is_available()).count() as u64;
        let never_used = partitions.iter().filter(|p| p.is_never_used()).count() as u64;
        let heavily_used_count = partitions.iter().filter(|p| p.is_heavily_used()).count() as u64;
        let internal_fragmentation = partitions.iter().map(|p| p.internal_fragmentation(jobs)).sum();

        let (valid_queue_length, valid_waiting_time) = queue
            .iter()
            .map(|key| &jobs[key])
            .filter(|job| job.fits_in(max_capacity))
            .fold((0, 0), |(count, waiting), job| (count + 1, waiting + job.waiting_time));

        TickMetrics {
            tick,
            throughput,
            used_percent: percent(throughput, total),
            never_used_percent: percent(never_used, total),
            heavily_used_count,
            heavily_used_percent: percent(heavily_used_count, total),
            internal_fragmentation,
            valid_waiting_time,
            valid_queue_length,
        }
    }
}

/// End-of-run aggregates, derived only from the recorded series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub ticks_recorded: u64,
    pub avg_throughput: f64,
    pub avg_used_percent: f64,
    pub avg_never_used_percent: f64,
    pub avg_heavily_used_count: f64,
    pub avg_heavily_used_percent: f64,
    pub total_fragmentation: u64,
    pub avg_fragmentation: f64,
    pub total_waiting_time: u64,
    pub avg_waiting_time: f64,
    pub total_queue_length: u64,
    pub avg_queue_length: f64,
}

/// Append-only series of [`TickMetrics`], one entry per tick.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    series: Vec<TickMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self { series: Vec::new() }
    }

    pub fn record(&mut self, metrics: TickMetrics) {
        debug_assert!(self.series.last().is_none_or(|last| last.tick < metrics.tick), "Metrics must be recorded in tick order");
        self.series.push(metrics);
    }

    pub fn series(&self) -> &[TickMetrics] {
        &self.series
    }

    pub fn latest(&self) -> Option<&TickMetrics> {
        self.series.last()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn mean(&self, value: impl Fn(&TickMetrics) -> f64) -> f64 {
        if self.series.is_empty() {
            return 0.0;
        }
        self.series.iter().map(value).sum::<f64>() / self.series.len() as f64
    }

    fn total(&self, value: impl Fn(&TickMetrics) -> u64) -> u64 {
        self.series.iter().map(value).sum()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            ticks_recorded: self.series.len() as u64,
            avg_throughput: self.mean(|m| m.throughput as f64),
            avg_used_percent: self.mean(|m| m.used_percent),
            avg_never_used_percent: self.mean(|m| m.never_used_percent),
            avg_heavily_used_count: self.mean(|m| m.heavily_used_count as f64),
            avg_heavily_used_percent: self.mean(|m| m.heavily_used_percent),
            total_fragmentation: self.total(|m| m.internal_fragmentation),
            avg_fragmentation: self.mean(|m| m.internal_fragmentation as f64),
            total_waiting_time: self.total(|m| m.valid_waiting_time),
            avg_waiting_time: self.mean(|m| m.valid_waiting_time as f64),
            total_queue_length: self.total(|m| m.valid_queue_length),
            avg_queue_length: self.mean(|m| m.valid_queue_length as f64),
        }
    }
}
