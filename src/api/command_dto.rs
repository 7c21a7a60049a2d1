use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::job_dto::OutputDto;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommandListDto {
    pub commands: Vec<CommandDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommandDto {
    pub id: i64,

    /// Human-readable command name.
    pub command: String,

    /// Declared outputs as `(name, type)` pairs. A command with no outputs
    /// cannot extend the graph and is filtered out of the menu.
    #[serde(default)]
    pub output: Vec<OutputDto>,
}

/// Parameter schema of one command.
///
/// The option maps go from parameter name to its declared kind string
/// (`"artifact"`, `"choice:[...]"`, `"integer"`, ...); `options` lists the
/// named default parameter sets a user can start from.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ParameterSchemaDto {
    pub req_options: HashMap<String, String>,
    pub opt_options: HashMap<String, String>,
    #[serde(default)]
    pub options: Vec<ParameterSetDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ParameterSetDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub values: HashMap<String, serde_json::Value>,
}
