pub mod backend;
pub mod backend_mock;
pub mod command_dto;
pub mod endpoint;
pub mod graph_dto;
pub mod job_dto;
pub mod workflow_dto;
