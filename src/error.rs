use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse backend JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Request to the processing backend failed: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The backend answered with `{status: "error", message: ...}`.
    /// The message is shown to the user verbatim.
    #[error("{0}")]
    BackendError(String),

    #[error(
        "Unrecognized parameter kind '{0}'. This usually means the backend \
         is newer than this client; please report it."
    )]
    UnknownParameterKind(String),

    #[error("Unrecognized node group '{0}' in graph snapshot")]
    UnknownNodeGroup(String),

    #[error("No workflow has been created yet; add a job first")]
    WorkflowNotCreated,

    #[error("Graph does not contain a node with id '{0}'")]
    UnknownNode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
