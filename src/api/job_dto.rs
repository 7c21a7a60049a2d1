use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Descriptor of a job as returned by workflow creation / job addition.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobDto {
    pub id: String,

    /// Display label, usually the command name.
    pub label: String,

    /// Ids of the artifacts / output placeholders feeding this job.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Declared outputs as `(name, type)` pairs.
    #[serde(default)]
    pub outputs: Vec<OutputDto>,
}

/// `(name, type)`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OutputDto(pub String, pub String);

/// One entry of the pre-graph job status listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobStatusDto {
    pub status: String,

    /// Current processing step, present while the job is running.
    #[serde(default)]
    pub step: Option<String>,

    /// Backend error message, present when `status` is `"error"`.
    #[serde(default)]
    pub error: Option<String>,
}

/// Detail view for the job-selection callback.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobDetailDto {
    pub job_id: String,
    pub job_status: String,
    #[serde(default)]
    pub job_parameters: HashMap<String, serde_json::Value>,
}
