use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::backend::WorkflowBackend;
use crate::api::command_dto::{CommandDto, ParameterSchemaDto};
use crate::api::graph_dto::GraphSnapshotDto;
use crate::api::job_dto::{JobDetailDto, JobDto, JobStatusDto};
use crate::api::workflow_dto::AddJobValueDto;
use crate::error::{Error, Result};

/// Scripted backend for tests.
///
/// Each `fetch_graph` call pops the next scripted snapshot (an empty one
/// once the script runs out), mutating calls answer from their scripted
/// reply, and every call is recorded so tests can assert on the request
/// sequence.
#[derive(Default)]
pub struct MockBackend {
    pub graphs: Mutex<VecDeque<GraphSnapshotDto>>,
    pub statuses: Mutex<VecDeque<HashMap<String, JobStatusDto>>>,
    pub commands: Mutex<Vec<CommandDto>>,
    pub command_options: Mutex<Option<ParameterSchemaDto>>,

    /// `Err(message)` simulates a `{status: "error"}` envelope.
    pub create_workflow_reply: Mutex<Option<std::result::Result<(String, JobDto), String>>>,
    pub add_job_reply: Mutex<Option<std::result::Result<JobDto, String>>>,
    pub remove_job_error: Mutex<Option<String>>,
    pub run_workflow_error: Mutex<Option<String>>,

    pub job_details: Mutex<HashMap<String, JobDetailDto>>,
    pub artifact_summaries: Mutex<HashMap<String, String>>,

    /// Recorded call descriptions, in order.
    pub calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> MockBackend {
        MockBackend::default()
    }

    pub fn push_graph(&self, snapshot: GraphSnapshotDto) {
        self.graphs.lock().unwrap().push_back(snapshot);
    }

    pub fn push_statuses(&self, statuses: HashMap<String, JobStatusDto>) {
        self.statuses.lock().unwrap().push_back(statuses);
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl WorkflowBackend for MockBackend {
    async fn fetch_graph(&self) -> Result<GraphSnapshotDto> {
        self.record("fetch_graph");
        Ok(self.graphs.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn fetch_job_statuses(&self) -> Result<HashMap<String, JobStatusDto>> {
        self.record("fetch_job_statuses");
        Ok(self.statuses.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn list_commands(&self, artifact_types: &[String], include_analysis: bool) -> Result<Vec<CommandDto>> {
        self.record(format!("list_commands({}, {})", artifact_types.join(","), include_analysis));
        Ok(self.commands.lock().unwrap().clone())
    }

    async fn fetch_command_options(&self, command_id: i64) -> Result<ParameterSchemaDto> {
        self.record(format!("fetch_command_options({})", command_id));
        self.command_options
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::BackendError(format!("No options scripted for command {}", command_id)))
    }

    async fn create_workflow(&self, command_id: i64, params: &HashMap<String, String>) -> Result<(String, JobDto)> {
        self.record(format!("create_workflow({}, {} params)", command_id, params.len()));
        match self.create_workflow_reply.lock().unwrap().clone() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(Error::BackendError(message)),
            None => Err(Error::BackendError("No workflow creation reply scripted".to_string())),
        }
    }

    async fn add_job(&self, workflow_id: &str, value: AddJobValueDto) -> Result<JobDto> {
        self.record(format!("add_job({}, dflt_params={})", workflow_id, value.dflt_params));
        match self.add_job_reply.lock().unwrap().clone() {
            Some(Ok(job)) => Ok(job),
            Some(Err(message)) => Err(Error::BackendError(message)),
            None => Err(Error::BackendError("No job addition reply scripted".to_string())),
        }
    }

    async fn remove_job(&self, workflow_id: &str, job_id: &str) -> Result<()> {
        self.record(format!("remove_job({}/{})", workflow_id, job_id));
        match self.remove_job_error.lock().unwrap().clone() {
            Some(message) => Err(Error::BackendError(message)),
            None => Ok(()),
        }
    }

    async fn run_workflow(&self, workflow_id: &str) -> Result<()> {
        self.record(format!("run_workflow({})", workflow_id));
        match self.run_workflow_error.lock().unwrap().clone() {
            Some(message) => Err(Error::BackendError(message)),
            None => Ok(()),
        }
    }

    async fn fetch_job_detail(&self, job_id: &str) -> Result<JobDetailDto> {
        self.record(format!("fetch_job_detail({})", job_id));
        self.job_details
            .lock()
            .unwrap()
            .get(job_id)
            .cloned()
            .ok_or_else(|| Error::BackendError(format!("Unknown job {}", job_id)))
    }

    async fn fetch_artifact_summary(&self, artifact_id: &str) -> Result<String> {
        self.record(format!("fetch_artifact_summary({})", artifact_id));
        self.artifact_summaries
            .lock()
            .unwrap()
            .get(artifact_id)
            .cloned()
            .ok_or_else(|| Error::BackendError(format!("Unknown artifact {}", artifact_id)))
    }
}
