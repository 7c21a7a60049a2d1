use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::job_dto::JobDto;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateWorkflowRequestDto {
    pub command_id: i64,
    pub params: HashMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateWorkflowResponseDto {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub job: Option<JobDto>,
}

/// JSON-Patch style mutation against the workflow collection.
/// `op: "add"` carries a value; `op: "remove"` addresses
/// `"<workflow_id>/<job_id>"` through the path alone.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkflowPatchDto {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AddJobValueDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddJobValueDto {
    /// Id of the default parameter set the job starts from.
    pub dflt_params: i64,

    /// Connections to prior steps, keyed by source id:
    /// `{source_id: {output_name: parameter_name}}`.
    pub connections: HashMap<String, HashMap<String, String>>,

    /// Literal required parameters only; connection-valued ones live in
    /// `connections`.
    pub req_params: HashMap<String, String>,

    pub opt_params: HashMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddJobResponseDto {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub job: Option<JobDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusResponseDto {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunWorkflowRequestDto {
    pub workflow_id: String,
}
