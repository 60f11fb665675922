pub mod job_dto;
pub mod partition_dto;
pub mod simulation_dto;
