use serde::de::DeserializeOwned;
use std::fs;

use crate::api::simulation_dto::SimulationConfigDto;
use crate::error::Result;

/// Parses a JSON file into a given type `T`.
///
/// This function reads a file from `file_path`, attempts to parse it
/// as JSON, and returns an instance of `T`.
///
/// Errors are automatically converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let data = fs::read_to_string(file_path)?;

    let parsed_data: T = serde_json::from_str(&data)?;

    Ok(parsed_data)
}

/// Loads a complete run description. Values are not validated here; that
/// happens when the DTOs are turned into specs.
pub fn load_config(file_path: &str) -> Result<SimulationConfigDto> {
    let config: SimulationConfigDto = parse_json_file(file_path)?;
    log::info!("Loaded configuration '{}': {} jobs, {} partitions, policy '{}'.", file_path, config.jobs.len(), config.partitions.len(), config.policy);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_missing_file_is_io_error() {
        let result = parse_json_file::<SimulationConfigDto>("does/not/exist.json");
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_config_defaults() {
        let config: SimulationConfigDto = serde_json::from_str(r#"{ "jobs": [{ "id": 1, "executionTime": 2, "size": 3 }], "partitions": [] }"#).unwrap();
        assert_eq!(config.policy, "first-fit");
        assert_eq!(config.stats_file, None);
        assert_eq!(config.jobs[0].execution_time, 2);
    }
}
