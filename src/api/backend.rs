use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;

use crate::api::command_dto::{CommandDto, CommandListDto, ParameterSchemaDto};
use crate::api::endpoint::Endpoint;
use crate::api::graph_dto::GraphSnapshotDto;
use crate::api::job_dto::{JobDetailDto, JobDto, JobStatusDto};
use crate::api::workflow_dto::{
    AddJobResponseDto, AddJobValueDto, CreateWorkflowRequestDto, CreateWorkflowResponseDto, RunWorkflowRequestDto,
    StatusResponseDto, WorkflowPatchDto,
};
use crate::error::{Error, Result};

/// Everything the controller needs from the processing backend.
///
/// The backend is the single source of truth for workflow state; the
/// controller only mirrors it. Tests substitute a scripted mock for this
/// trait instead of standing up an HTTP server.
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    async fn fetch_graph(&self) -> Result<GraphSnapshotDto>;

    async fn fetch_job_statuses(&self) -> Result<HashMap<String, JobStatusDto>>;

    async fn list_commands(&self, artifact_types: &[String], include_analysis: bool) -> Result<Vec<CommandDto>>;

    async fn fetch_command_options(&self, command_id: i64) -> Result<ParameterSchemaDto>;

    /// Creates a new workflow from its first job. Returns the workflow id
    /// together with the created job's descriptor.
    async fn create_workflow(&self, command_id: i64, params: &HashMap<String, String>) -> Result<(String, JobDto)>;

    /// Adds a job to an existing workflow.
    async fn add_job(&self, workflow_id: &str, value: AddJobValueDto) -> Result<JobDto>;

    /// Removes an in-construction job from a workflow.
    async fn remove_job(&self, workflow_id: &str, job_id: &str) -> Result<()>;

    /// Submits the workflow for execution.
    async fn run_workflow(&self, workflow_id: &str) -> Result<()>;

    async fn fetch_job_detail(&self, job_id: &str) -> Result<JobDetailDto>;

    /// Rendered summary fragment for an artifact.
    async fn fetch_artifact_summary(&self, artifact_id: &str) -> Result<String>;
}

/// `WorkflowBackend` over HTTP, using the endpoint table in
/// [`crate::api::endpoint`].
#[derive(Debug)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<HttpBackend> {
        let client = Client::builder().build()?;
        Ok(HttpBackend { base_url: base_url.trim_end_matches('/').to_string(), client })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Maps the backend's `{status, message}` envelope onto our error
    /// taxonomy: anything but `"success"` carries a user-facing message.
    fn check_envelope(status: &str, message: Option<String>) -> Result<()> {
        if status == "success" {
            Ok(())
        } else {
            Err(Error::BackendError(message.unwrap_or_else(|| "The processing backend reported an error.".to_string())))
        }
    }
}

#[async_trait]
impl WorkflowBackend for HttpBackend {
    async fn fetch_graph(&self) -> Result<GraphSnapshotDto> {
        let response = self.client.get(self.url(Endpoint::ProcessGraph)).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    async fn fetch_job_statuses(&self) -> Result<HashMap<String, JobStatusDto>> {
        let response = self.client.get(self.url(Endpoint::JobList)).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    async fn list_commands(&self, artifact_types: &[String], include_analysis: bool) -> Result<Vec<CommandDto>> {
        let response = self
            .client
            .get(self.url(Endpoint::CommandList))
            .query(&[("artifact_types", artifact_types.join(",")), ("include_analysis", include_analysis.to_string())])
            .send()
            .await?;

        let listing: CommandListDto = response.error_for_status()?.json().await?;
        Ok(listing.commands)
    }

    async fn fetch_command_options(&self, command_id: i64) -> Result<ParameterSchemaDto> {
        let response = self
            .client
            .get(self.url(Endpoint::CommandOptions))
            .query(&[("command_id", command_id.to_string())])
            .send()
            .await?;
        Ok(response.error_for_status()?.json().await?)
    }

    async fn create_workflow(&self, command_id: i64, params: &HashMap<String, String>) -> Result<(String, JobDto)> {
        let request = CreateWorkflowRequestDto { command_id, params: params.clone() };
        let response = self.client.post(self.url(Endpoint::Workflow)).json(&request).send().await?;
        let body: CreateWorkflowResponseDto = response.error_for_status()?.json().await?;

        Self::check_envelope(&body.status, body.message)?;

        match (body.workflow_id, body.job) {
            (Some(workflow_id), Some(job)) => Ok((workflow_id, job)),
            _ => {
                log::error!("Workflow creation reported success but carried no workflow id / job descriptor.");
                Err(Error::BackendError("Workflow creation response was incomplete.".to_string()))
            }
        }
    }

    async fn add_job(&self, workflow_id: &str, value: AddJobValueDto) -> Result<JobDto> {
        let patch = WorkflowPatchDto { op: "add".to_string(), path: workflow_id.to_string(), value: Some(value) };
        let response = self.client.patch(self.url(Endpoint::Workflow)).json(&patch).send().await?;
        let body: AddJobResponseDto = response.error_for_status()?.json().await?;

        Self::check_envelope(&body.status, body.message)?;

        body.job.ok_or_else(|| {
            log::error!("Job addition reported success but carried no job descriptor.");
            Error::BackendError("Job addition response was incomplete.".to_string())
        })
    }

    async fn remove_job(&self, workflow_id: &str, job_id: &str) -> Result<()> {
        let patch =
            WorkflowPatchDto { op: "remove".to_string(), path: format!("{}/{}", workflow_id, job_id), value: None };
        let response = self.client.patch(self.url(Endpoint::Workflow)).json(&patch).send().await?;
        let body: StatusResponseDto = response.error_for_status()?.json().await?;

        Self::check_envelope(&body.status, body.message)
    }

    async fn run_workflow(&self, workflow_id: &str) -> Result<()> {
        let request = RunWorkflowRequestDto { workflow_id: workflow_id.to_string() };
        let response = self.client.post(self.url(Endpoint::WorkflowRun)).json(&request).send().await?;
        let body: StatusResponseDto = response.error_for_status()?.json().await?;

        Self::check_envelope(&body.status, body.message)
    }

    async fn fetch_job_detail(&self, job_id: &str) -> Result<JobDetailDto> {
        let response = self
            .client
            .get(self.url(Endpoint::JobDetail))
            .query(&[("job_id", job_id)])
            .send()
            .await?;
        Ok(response.error_for_status()?.json().await?)
    }

    async fn fetch_artifact_summary(&self, artifact_id: &str) -> Result<String> {
        let response = self.client.get(self.url(Endpoint::ArtifactSummary(artifact_id.to_string()))).send().await?;
        Ok(response.error_for_status()?.text().await?)
    }
}
