use std::str::FromStr;

use crate::error::Error;

/// What a graph node stands for.
///
/// `Type` nodes are output placeholders: a job that has not run yet only
/// knows the *type* of each output it will produce, so the graph shows a
/// placeholder node per declared output until the real artifact exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeGroup {
    Artifact,
    Job,
    Type,
}

impl FromStr for NodeGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artifact" => Ok(NodeGroup::Artifact),
            "job" => Ok(NodeGroup::Job),
            "type" => Ok(NodeGroup::Type),
            other => Err(Error::UnknownNodeGroup(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub group: NodeGroup,
    pub label: String,

    /// Artifact/output type tag. Used to filter which commands apply to a
    /// selection; jobs carry no type.
    pub artifact_type: Option<String>,
}

impl Node {
    pub fn artifact(id: impl Into<String>, label: impl Into<String>, artifact_type: impl Into<String>) -> Node {
        Node {
            id: id.into(),
            group: NodeGroup::Artifact,
            label: label.into(),
            artifact_type: Some(artifact_type.into()),
        }
    }

    pub fn job(id: impl Into<String>, label: impl Into<String>) -> Node {
        Node { id: id.into(), group: NodeGroup::Job, label: label.into(), artifact_type: None }
    }

    /// Placeholder for a not-yet-materialized job output. The id is the
    /// owning job's id joined with the output name, e.g. `"1234:demuxed"`.
    pub fn output_placeholder(job_id: &str, output_name: &str, output_type: impl Into<String>) -> Node {
        Node {
            id: format!("{}:{}", job_id, output_name),
            group: NodeGroup::Type,
            label: output_name.to_string(),
            artifact_type: Some(output_type.into()),
        }
    }
}
