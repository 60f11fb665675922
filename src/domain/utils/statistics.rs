use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::domain::metrics::TickMetrics;
use crate::domain::placement_policy::PlacementPolicy;
use crate::error::{Error, Result};

/// Each row of the statistics file holds the metrics of one tick.
/// This enum specifies all columns of the output file, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatParameter {
    /// Placement policy of the run, so several runs can share one file.
    Policy,

    /// Simulated time of the measurement.
    Tick,

    /// Number of occupied partitions.
    Throughput,

    UsedPercent,
    NeverUsedPercent,
    HeavilyUsedCount,
    HeavilyUsedPercent,

    /// Unused capacity inside occupied partitions.
    InternalFragmentation,

    /// Summed waiting time of queued jobs that fit some partition.
    ValidWaitingTime,
    ValidQueueLength,
}

impl StatParameter {
    pub const ALL: [StatParameter; 10] = [
        StatParameter::Policy,
        StatParameter::Tick,
        StatParameter::Throughput,
        StatParameter::UsedPercent,
        StatParameter::NeverUsedPercent,
        StatParameter::HeavilyUsedCount,
        StatParameter::HeavilyUsedPercent,
        StatParameter::InternalFragmentation,
        StatParameter::ValidWaitingTime,
        StatParameter::ValidQueueLength,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            StatParameter::Policy => "Policy",
            StatParameter::Tick => "Tick",
            StatParameter::Throughput => "Throughput",
            StatParameter::UsedPercent => "UsedPercent",
            StatParameter::NeverUsedPercent => "NeverUsedPercent",
            StatParameter::HeavilyUsedCount => "HeavilyUsedCount",
            StatParameter::HeavilyUsedPercent => "HeavilyUsedPercent",
            StatParameter::InternalFragmentation => "InternalFragmentation",
            StatParameter::ValidWaitingTime => "ValidWaitingTime",
            StatParameter::ValidQueueLength => "ValidQueueLength",
        }
    }

    /// Returns the defined order of columns for the CSV header
    pub fn headers() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.header()).collect()
    }
}

/// store values in their native format, only format them when writing to the CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl StatValue {
    fn to_field(&self) -> String {
        match self {
            StatValue::Integer(i) => i.to_string(),
            StatValue::Float(f) => format!("{:.2}", f),
            StatValue::Text(t) => t.clone(),
        }
    }
}

impl From<u64> for StatValue {
    fn from(v: u64) -> Self {
        StatValue::Integer(v)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

fn value_of(param: StatParameter, policy: PlacementPolicy, metrics: &TickMetrics) -> StatValue {
    match param {
        StatParameter::Policy => policy.name().into(),
        StatParameter::Tick => metrics.tick.into(),
        StatParameter::Throughput => metrics.throughput.into(),
        StatParameter::UsedPercent => metrics.used_percent.into(),
        StatParameter::NeverUsedPercent => metrics.never_used_percent.into(),
        StatParameter::HeavilyUsedCount => metrics.heavily_used_count.into(),
        StatParameter::HeavilyUsedPercent => metrics.heavily_used_percent.into(),
        StatParameter::InternalFragmentation => metrics.internal_fragmentation.into(),
        StatParameter::ValidWaitingTime => metrics.valid_waiting_time.into(),
        StatParameter::ValidQueueLength => metrics.valid_queue_length.into(),
    }
}

/// Writes metric series as `;`-delimited CSV, header first.
pub struct StatisticsWriter<W: Write> {
    csv_wtr: csv::Writer<W>,
}

impl StatisticsWriter<Box<dyn Write>> {
    /// Opens `path` for writing, or stdout when no path is given.
    pub fn init(path: Option<&Path>) -> Result<Self> {
        let writer: Box<dyn Write> = match path {
            Some(p) => Box::new(File::create(p)?),
            None => Box::new(io::stdout()),
        };

        Self::from_writer(writer)
    }
}

impl<W: Write> StatisticsWriter<W> {
    pub fn from_writer(writer: W) -> Result<Self> {
        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
        csv_wtr.write_record(StatParameter::headers())?;

        Ok(StatisticsWriter { csv_wtr })
    }

    pub fn write_tick(&mut self, policy: PlacementPolicy, metrics: &TickMetrics) -> Result<()> {
        let row: Vec<String> = StatParameter::ALL.iter().map(|&p| value_of(p, policy, metrics).to_field()).collect();
        self.csv_wtr.write_record(&row)?;
        Ok(())
    }

    pub fn write_series(&mut self, policy: PlacementPolicy, series: &[TickMetrics]) -> Result<()> {
        for metrics in series {
            self.write_tick(policy, metrics)?;
        }
        log::debug!("Wrote {} statistics rows for {}.", series.len(), policy);
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.csv_wtr.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.csv_wtr.into_inner().map_err(|e| Error::IoError(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(tick: u64, fragmentation: u64) -> TickMetrics {
        TickMetrics {
            tick,
            throughput: 2,
            used_percent: 100.0,
            never_used_percent: 0.0,
            heavily_used_count: 0,
            heavily_used_percent: 0.0,
            internal_fragmentation: fragmentation,
            valid_waiting_time: 0,
            valid_queue_length: 0,
        }
    }

    fn written(policy: PlacementPolicy, series: &[TickMetrics]) -> String {
        let mut writer = StatisticsWriter::from_writer(Vec::new()).unwrap();
        writer.write_series(policy, series).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_only_for_empty_series() {
        let out = written(PlacementPolicy::FirstFit, &[]);
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("Policy;Tick;Throughput;"));
        assert_eq!(out.lines().next().unwrap().split(';').count(), StatParameter::ALL.len());
    }

    #[test]
    fn test_one_row_per_tick_in_header_order() {
        let out = written(PlacementPolicy::BestFit, &[metrics(0, 10), metrics(1, 5)]);
        let rows: Vec<&str> = out.lines().skip(1).collect();

        assert_eq!(rows, vec!["best-fit;0;2;100.00;0.00;0;0.00;10;0;0", "best-fit;1;2;100.00;0.00;0;0.00;5;0;0"]);
    }

    #[test]
    fn test_headers_match_parameters() {
        assert_eq!(StatParameter::headers().len(), StatParameter::ALL.len());
        assert_eq!(StatParameter::headers()[7], "InternalFragmentation");
    }
}
