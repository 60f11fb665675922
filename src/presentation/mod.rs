//! Text rendering of snapshots and reports for the terminal.
//!
//! Everything here reads the structured values the simulator hands out and
//! returns a `String`; nothing prints and nothing touches simulator state.

use colored::Colorize;
use std::fmt::Write;

use crate::domain::report::FinalReport;
use crate::domain::snapshot::{PartitionView, TickSnapshot};

/// Width of the memory bar in characters.
pub const BAR_WIDTH: usize = 30;

fn bar(view: &PartitionView) -> String {
    let Some(occupant) = view.occupant else {
        return "·".repeat(BAR_WIDTH).dimmed().to_string();
    };

    // Round up so any occupant is visible. u128 keeps the product in range for any u64 size.
    let used = ((occupant.size as u128 * BAR_WIDTH as u128).div_ceil(view.capacity as u128) as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(used).green(), "░".repeat(BAR_WIDTH - used).yellow())
}

fn partition_line(view: &PartitionView) -> String {
    let occupant = match view.occupant {
        Some(o) => format!("Job {} (size {}, {} left)", o.job, o.size, o.remaining_time),
        None => "empty".dimmed().to_string(),
    };

    format!("Partition {:>3} [{:>7}..{:>7}) {} {}", view.id.id, view.start_offset, view.cumulative_offset, bar(view), occupant)
}

/// The status block printed once per tick.
pub fn render_snapshot(snapshot: &TickSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", format!("Time Elapsed: {}", snapshot.tick).bold());
    for view in &snapshot.partitions {
        let _ = writeln!(out, "{}", partition_line(view));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Throughput: {}", snapshot.metrics.throughput);
    let _ = writeln!(out, "Internal fragmentation: {}", snapshot.metrics.internal_fragmentation);

    let queue = if snapshot.queue.is_empty() {
        "empty".to_string()
    } else {
        snapshot.queue.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
    };
    let _ = writeln!(out, "Queue: {}", queue);

    out
}

pub fn render_final_report(report: &FinalReport) -> String {
    let mut out = String::new();
    let m = &report.metrics;

    let _ = writeln!(out, "{}", format!("=== {} ===", report.policy).bold());
    let _ = writeln!(out, "Time Elapsed: {}", report.ticks_elapsed);
    if !report.terminated {
        let _ = writeln!(out, "{}", "Run stopped before termination.".yellow());
    }
    let _ = writeln!(out, "Average throughput:          {:.2}", m.avg_throughput);
    let _ = writeln!(out, "Average storage used:        {:.2}%", m.avg_used_percent);
    let _ = writeln!(out, "Average never used:          {:.2}%", m.avg_never_used_percent);
    let _ = writeln!(out, "Average heavily used:        {:.2} ({:.2}%)", m.avg_heavily_used_count, m.avg_heavily_used_percent);
    let _ = writeln!(out, "Internal fragmentation:      {} total, {:.2} per tick", m.total_fragmentation, m.avg_fragmentation);
    let _ = writeln!(out, "Waiting time in queue:       {} total, {:.2} per tick", m.total_waiting_time, m.avg_waiting_time);
    let _ = writeln!(out, "Waiting queue length:        {} total, {:.2} per tick", m.total_queue_length, m.avg_queue_length);
    let _ = writeln!(out, "Completed jobs:              {} (avg turnaround {:.2})", report.completed_jobs.len(), report.avg_turnaround());

    if report.has_stranded_jobs() {
        let ids = report.stranded_jobs.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ");
        let _ = writeln!(out, "{}", format!("Stranded jobs (larger than every partition): {}", ids).red());
    }

    out
}

/// One row per policy, in the order given.
pub fn render_comparison(reports: &[FinalReport]) -> String {
    let mut out = String::new();

    let header = format!(
        "{:<10} {:>6} {:>10} {:>8} {:>12} {:>10} {:>10} {:>9}",
        "policy", "ticks", "throughput", "used %", "fragment.", "waiting", "queue", "stranded"
    );
    let _ = writeln!(out, "{}", header.bold());

    for report in reports {
        let m = &report.metrics;
        let _ = writeln!(
            out,
            "{:<10} {:>6} {:>10.2} {:>8.2} {:>12} {:>10.2} {:>10.2} {:>9}",
            report.policy.name(),
            report.ticks_elapsed,
            m.avg_throughput,
            m.avg_used_percent,
            m.total_fragmentation,
            m.avg_waiting_time,
            m.avg_queue_length,
            report.stranded_jobs.len()
        );
    }

    out
}
