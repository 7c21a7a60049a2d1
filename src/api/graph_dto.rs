use serde::{Deserialize, Serialize};

/// Graph snapshot as the backend serves it: positional node tuples
/// `(group, type, id, label)` and edge pairs `(from, to)`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GraphSnapshotDto {
    pub nodes: Vec<RawNodeDto>,
    pub edges: Vec<RawEdgeDto>,
}

/// `(group, type, id, label)`; the type slot is null for job nodes.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawNodeDto(pub String, pub Option<String>, pub String, pub String);

/// `(from, to)`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawEdgeDto(pub String, pub String);
