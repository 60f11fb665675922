//! Reading and writing the job and partition tables.
//!
//! Two formats are accepted. Files ending in `.csv` are comma separated with a
//! header row naming the columns. Everything else is the plain table format: a
//! header line that is ignored, then one whitespace-separated row per entry.

use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use crate::api::{job_dto::JobDto, partition_dto::PartitionDto};
use crate::domain::{job::JobSpec, partition::PartitionSpec};
use crate::error::{Error, Result};

/// A DTO that can be read from a table row.
pub trait TableRow: DeserializeOwned {
    /// Column names, in the order the plain format lists them.
    const COLUMNS: &'static [&'static str];

    /// `fields` has exactly `COLUMNS.len()` entries.
    fn from_fields(fields: &[i64]) -> Self;
}

impl TableRow for JobDto {
    const COLUMNS: &'static [&'static str] = &["job_id", "execution_time", "size"];

    fn from_fields(fields: &[i64]) -> Self {
        JobDto { id: fields[0], execution_time: fields[1], size: fields[2] }
    }
}

impl TableRow for PartitionDto {
    const COLUMNS: &'static [&'static str] = &["partition_id", "capacity"];

    fn from_fields(fields: &[i64]) -> Self {
        PartitionDto { id: fields[0], capacity: fields[1] }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Reads a table file, picking the format from the extension.
pub fn read_table<T: TableRow>(path: &Path) -> Result<Vec<T>> {
    let source_name = path.display().to_string();

    let rows = if is_csv(path) {
        parse_csv_table(File::open(path)?, &source_name)?
    } else {
        parse_whitespace_table(&fs::read_to_string(path)?, &source_name)?
    };

    log::debug!("Read {} rows from '{}'.", rows.len(), source_name);
    Ok(rows)
}

/// Parses the plain format. The first line is a header and is skipped, as are
/// blank lines.
///
/// # Errors
/// `Error::MalformedRow` with the 1-based line number for a wrong column count
/// or a field that is not an integer.
pub fn parse_whitespace_table<T: TableRow>(contents: &str, source_name: &str) -> Result<Vec<T>> {
    let mut rows = Vec::new();

    for (index, line) in contents.lines().enumerate().skip(1) {
        let line_number = index + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.is_empty() {
            continue;
        }
        if fields.len() != T::COLUMNS.len() {
            return Err(Error::malformed_row(
                source_name,
                line_number,
                format!("expected {} columns ({}), found {}", T::COLUMNS.len(), T::COLUMNS.join(" "), fields.len()),
            ));
        }

        let values = fields
            .iter()
            .map(|field| field.parse::<i64>().map_err(|_| Error::malformed_row(source_name, line_number, format!("'{}' is not an integer", field))))
            .collect::<Result<Vec<i64>>>()?;

        rows.push(T::from_fields(&values));
    }

    Ok(rows)
}

/// Parses the CSV format through the DTO's serde names (camelCase, with the
/// snake_case column names accepted as aliases).
pub fn parse_csv_table<T: TableRow, R: Read>(reader: R, source_name: &str) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<T>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                return Err(Error::malformed_row(source_name, line, e.to_string()));
            }
        }
    }

    Ok(rows)
}

pub fn load_jobs(path: &Path) -> Result<Vec<JobSpec>> {
    read_table::<JobDto>(path)?.into_iter().map(JobSpec::try_from).collect()
}

pub fn load_partitions(path: &Path) -> Result<Vec<PartitionSpec>> {
    read_table::<PartitionDto>(path)?.into_iter().map(PartitionSpec::try_from).collect()
}

/// Writes jobs in the plain format, header included.
pub fn write_job_table<W: Write>(mut writer: W, jobs: &[JobSpec]) -> Result<()> {
    writeln!(writer, "{}", JobDto::COLUMNS.join(" "))?;
    for job in jobs {
        writeln!(writer, "{} {} {}", job.id, job.execution_time, job.size)?;
    }
    Ok(())
}

/// Writes partitions in the plain format, header included.
pub fn write_partition_table<W: Write>(mut writer: W, partitions: &[PartitionSpec]) -> Result<()> {
    writeln!(writer, "{}", PartitionDto::COLUMNS.join(" "))?;
    for partition in partitions {
        writeln!(writer, "{} {}", partition.id, partition.capacity)?;
    }
    Ok(())
}
