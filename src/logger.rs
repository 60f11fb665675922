use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use std::fs;

// Relative to the working directory of the binary.
const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "simulation.log";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Installs the process-wide logger for a simulation run.
///
/// Only the CLI calls this; library code logs through the `log` macros and
/// stays silent unless a binary or test installs a backend.
///
/// `RUST_LOG` picks the level (`info` when unset or unparsable), e.g.
/// `RUST_LOG=trace fixed_partition_sim run ...` to see every tick. Records go
/// to stderr in color and, without color, to `logs/simulation.log`.
pub fn init() {
    init_with_level(None);
}

/// Same as [`init`], but `level_override` wins over `RUST_LOG` when given.
/// The CLI uses it for `--quiet`.
pub fn init_with_level(level_override: Option<LevelFilter>) {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Cannot create '{}' for the simulation log: {}", LOG_DIR, e);
    }

    let log_file_path = format!("{}/{}", LOG_DIR, LOG_FILE);

    // debug shows admissions and completions, trace every tick.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let log_level_filter = level_override.unwrap_or_else(|| log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info));

    let base_config = Dispatch::new().level(log_level_filter).level_for("serde", LevelFilter::Warn);

    let console_config = Dispatch::new()
        .format(|out, message, record| {
            let colors = fern::colors::ColoredLevelConfig::new()
                .error(fern::colors::Color::Red)
                .warn(fern::colors::Color::Yellow)
                .info(fern::colors::Color::Green)
                .debug(fern::colors::Color::Blue)
                .trace(fern::colors::Color::BrightBlack);

            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format(TIME_FORMAT),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = base_config.chain(console_config);

    match fern::log_file(&log_file_path) {
        Ok(file) => {
            let file_config = Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!("[{} {} {}] {}", Local::now().format(TIME_FORMAT), record.level(), record.target(), message))
                })
                .chain(file);
            dispatch = dispatch.chain(file_config);
        }
        Err(e) => eprintln!("Failed to open log file '{}': {}. Logging to stderr only.", log_file_path, e),
    }

    dispatch.apply().unwrap_or_else(|e| {
        eprintln!("Logger already installed, keeping it: {}", e);
    });

    log::debug!("Simulation logging at level {}, file '{}'.", log_level_filter, log_file_path);
}
