/// REST endpoints of the processing backend, relative to its base URL.
#[derive(Debug)]
pub enum Endpoint {
    /// Graph snapshot for the current processing network.
    ProcessGraph,
    /// Per-job status listing, used before the graph has any artifacts.
    JobList,
    /// Commands applicable to a set of artifact types.
    CommandList,
    /// Parameter schema of one command.
    CommandOptions,
    /// Workflow collection: POST creates, PATCH adds/removes jobs.
    Workflow,
    /// Submits a workflow for execution.
    WorkflowRun,
    /// Detail view of one job.
    JobDetail,
    /// Rendered summary fragment of one artifact.
    ArtifactSummary(String),
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Self::ProcessGraph => "/process/graph/".to_string(),
            Self::JobList => "/process/jobs/".to_string(),
            Self::CommandList => "/process/commands/".to_string(),
            Self::CommandOptions => "/process/commands/options/".to_string(),
            Self::Workflow => "/process/workflow/".to_string(),
            Self::WorkflowRun => "/process/workflow/run/".to_string(),
            Self::JobDetail => "/process/job/".to_string(),
            Self::ArtifactSummary(artifact_id) => format!("/artifact/{}/summary/", artifact_id),
        }
    }
}
