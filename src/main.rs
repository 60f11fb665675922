use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter};
use std::path::{Path, PathBuf};

use fixed_partition_sim::domain::job::JobSpec;
use fixed_partition_sim::domain::partition::PartitionSpec;
use fixed_partition_sim::domain::placement_policy::PlacementPolicy;
use fixed_partition_sim::domain::simulator::Simulator;
use fixed_partition_sim::domain::utils::statistics::StatisticsWriter;
use fixed_partition_sim::domain::workload::{WorkloadParams, random_workload};
use fixed_partition_sim::loader::table::{load_jobs, load_partitions, write_job_table, write_partition_table};
use fixed_partition_sim::{FinalReport, TickSnapshot, build_simulator_from_config, logger, presentation};

/// Simulates fixed-partition memory allocation under First-, Best- and Worst-Fit
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Inputs {
    /// Job table (plain or .csv)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    jobs: PathBuf,

    /// Partition table (plain or .csv)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    partitions: PathBuf,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct DisplayOptions {
    /// Wait for Enter between ticks
    #[arg(long)]
    step: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Do not print the memory chart every tick
    #[arg(long)]
    no_chart: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one placement policy
    Run {
        #[command(flatten)]
        inputs: Inputs,

        /// first-fit, best-fit or worst-fit
        #[arg(long, default_value_t = PlacementPolicy::FirstFit)]
        policy: PlacementPolicy,

        /// Write the per-tick metrics as CSV ("-" for stdout, not with --json)
        #[arg(long)]
        stats: Option<PathBuf>,

        #[command(flatten)]
        display: DisplayOptions,
    },

    /// Run all three policies on the same input and compare them
    Compare {
        #[command(flatten)]
        inputs: Inputs,

        /// Write one statistics CSV per policy into this directory
        #[arg(long)]
        stats_dir: Option<PathBuf>,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a simulation described by a JSON file
    Config {
        file: String,

        #[command(flatten)]
        display: DisplayOptions,
    },

    /// Write a random job table and partition table
    Generate {
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value_t = 25)]
        job_count: usize,

        #[arg(long, default_value_t = 10)]
        partition_count: usize,

        #[arg(long, default_value = "job_list.txt")]
        jobs_out: PathBuf,

        #[arg(long, default_value = "mem_list.txt")]
        partitions_out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_with_level(cli.quiet.then_some(LevelFilter::Warn));

    match cli.command {
        Command::Run { inputs, policy, stats, display } => {
            let stats = stats.as_deref().map(|path| stats_destination(path, display.json)).transpose()?;

            let (jobs, partitions) = load_inputs(&inputs)?;
            let mut simulator = Simulator::new(jobs, partitions, policy)?;

            let report = drive(&mut simulator, display);
            if let Some(destination) = stats {
                export_statistics(&simulator, destination);
            }
            print_report(&report, display.json)?;
        }
        Command::Compare { inputs, stats_dir, json } => {
            let (jobs, partitions) = load_inputs(&inputs)?;

            if let Some(dir) = &stats_dir {
                fs::create_dir_all(dir).with_context(|| format!("Could not create '{}'", dir.display()))?;
            }

            let mut reports = Vec::new();
            for policy in PlacementPolicy::ALL {
                let mut simulator = Simulator::new(jobs.clone(), partitions.clone(), policy)?;
                reports.push(simulator.run_to_completion());

                if let Some(dir) = &stats_dir {
                    export_statistics(&simulator, Some(&dir.join(format!("{}.csv", policy.name()))));
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    println!("{}", presentation::render_final_report(report));
                }
                println!("{}", presentation::render_comparison(&reports));
            }
        }
        Command::Config { file, display } => {
            let (mut simulator, stats_file) = build_simulator_from_config(&file).with_context(|| format!("Could not set up simulation from '{}'", file))?;

            let report = drive(&mut simulator, display);
            if let Some(path) = stats_file {
                export_statistics(&simulator, Some(Path::new(&path)));
            }
            print_report(&report, display.json)?;
        }
        Command::Generate { seed, job_count, partition_count, jobs_out, partitions_out } => {
            let params = WorkloadParams { job_count, partition_count, ..WorkloadParams::default() };
            let (jobs, partitions) = random_workload(seed, &params)?;

            write_job_table(BufWriter::new(File::create(&jobs_out)?), &jobs)?;
            write_partition_table(BufWriter::new(File::create(&partitions_out)?), &partitions)?;
            log::info!("Wrote {} jobs to '{}' and {} partitions to '{}'.", jobs.len(), jobs_out.display(), partitions.len(), partitions_out.display());
        }
    }

    Ok(())
}

fn load_inputs(inputs: &Inputs) -> Result<(Vec<JobSpec>, Vec<PartitionSpec>)> {
    let jobs = load_jobs(&inputs.jobs).with_context(|| format!("Could not load jobs from '{}'", inputs.jobs.display()))?;
    let partitions = load_partitions(&inputs.partitions).with_context(|| format!("Could not load partitions from '{}'", inputs.partitions.display()))?;
    Ok((jobs, partitions))
}

/// `None` means stdout. The JSON report also goes to stdout, so the two cannot share it.
fn stats_destination(path: &Path, json: bool) -> Result<Option<&Path>> {
    if path != Path::new("-") {
        return Ok(Some(path));
    }
    if json {
        anyhow::bail!("--stats - and --json would both write to stdout; give --stats a file path");
    }
    Ok(None)
}

/// Runs to termination, printing the chart and pausing as requested.
fn drive(simulator: &mut Simulator, display: DisplayOptions) -> FinalReport {
    // The chart and the JSON report both go to stdout; keep them apart.
    let show_chart = !display.no_chart && !display.json;

    simulator.run_with_observer(&mut |snapshot: &TickSnapshot| {
        if show_chart {
            println!("{}", presentation::render_snapshot(snapshot));
        }
        if display.step {
            wait_for_enter();
        }
    })
}

fn wait_for_enter() {
    let mut line = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut line) {
        log::warn!("Could not read from stdin, continuing without pause: {}", e);
    }
}

/// Statistics are a by-product: a failed export is logged, the run still reports.
fn export_statistics(simulator: &Simulator, path: Option<&Path>) {
    let result = StatisticsWriter::init(path).and_then(|mut writer| {
        writer.write_series(simulator.policy(), simulator.metrics().series())?;
        writer.flush()
    });

    match (result, path) {
        (Ok(()), Some(p)) => log::info!("Statistics written to '{}'.", p.display()),
        (Ok(()), None) => {}
        (Err(e), _) => log::error!("Failed to export statistics: {}", e),
    }
}

fn print_report(report: &FinalReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", presentation::render_final_report(report));
    }
    Ok(())
}
