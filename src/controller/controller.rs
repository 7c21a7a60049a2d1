use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::api::backend::WorkflowBackend;
use crate::api::command_dto::{CommandDto, ParameterSetDto};
use crate::api::graph_dto::GraphSnapshotDto;
use crate::api::job_dto::{JobDetailDto, JobDto};
use crate::api::workflow_dto::AddJobValueDto;
use crate::controller::params::{split_required, ParamValue, ParameterKind, ParameterWidget};
use crate::controller::view::{AlertLevel, GraphView};
use crate::error::{Error, Result};
use crate::graph::node::{Node, NodeGroup};
use crate::graph::store::GraphStore;

/// Outcome of feeding a server snapshot to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialization {
    /// The snapshot carried nodes; the graph has been drawn.
    Rendered,
    /// The backend has not materialized any artifacts yet; the caller
    /// should drive [`WorkflowGraphController::poll_until_ready`].
    Pending,
}

/// Everything a user needs to fill in before a command can become a job.
#[derive(Debug, Clone)]
pub struct CommandForm {
    pub widgets: Vec<ParameterWidget>,
    pub parameter_sets: Vec<ParameterSetDto>,
}

/// Client-side controller for one processing workflow.
///
/// Owns an in-memory mirror of the backend's workflow graph and keeps it
/// consistent with user-issued mutations. The backend stays authoritative:
/// the local graph is only touched after a positive response, so a failed
/// request can never leave the two out of sync.
pub struct WorkflowGraphController {
    backend: Arc<dyn WorkflowBackend>,
    view: Arc<dyn GraphView>,
    store: GraphStore,

    /// Unset until the first job creates the workflow.
    workflow_id: Option<String>,

    /// Jobs added this session and not yet submitted. Submission is
    /// enabled exactly while this is non-zero.
    in_construction: usize,

    poll_interval: Duration,
}

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

impl WorkflowGraphController {
    pub fn new(backend: Arc<dyn WorkflowBackend>, view: Arc<dyn GraphView>) -> WorkflowGraphController {
        WorkflowGraphController {
            backend,
            view,
            store: GraphStore::new(),
            workflow_id: None,
            in_construction: 0,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> WorkflowGraphController {
        self.poll_interval = interval;
        self
    }

    /// Read-only access to the graph for rendering and queries.
    pub fn graph(&self) -> &GraphStore {
        &self.store
    }

    pub fn workflow_id(&self) -> Option<&str> {
        self.workflow_id.as_deref()
    }

    pub fn in_construction(&self) -> usize {
        self.in_construction
    }

    pub fn can_submit(&self) -> bool {
        self.in_construction > 0
    }

    /// Fetches the current snapshot and either renders it or, when the
    /// backend has no artifacts yet, polls until it does.
    pub async fn start(&mut self) -> Result<()> {
        let snapshot = self.backend.fetch_graph().await?;
        match self.initialize(snapshot)? {
            Initialization::Rendered => Ok(()),
            Initialization::Pending => self.poll_until_ready().await,
        }
    }

    /// Feeds one server snapshot to the controller.
    ///
    /// An empty snapshot means the initial artifacts are still being
    /// computed; nothing is drawn and the caller is told to poll.
    pub fn initialize(&mut self, snapshot: GraphSnapshotDto) -> Result<Initialization> {
        if snapshot.nodes.is_empty() {
            log::info!("Snapshot has no nodes yet; staying in job-status mode.");
            return Ok(Initialization::Pending);
        }

        self.apply_snapshot(snapshot)?;
        Ok(Initialization::Rendered)
    }

    /// Level-triggered poll: on every tick the job statuses are pushed to
    /// the status panel and the snapshot is re-fetched; the first
    /// non-empty snapshot is rendered and the ticker is dropped.
    pub async fn poll_until_ready(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;

            let statuses = self.backend.fetch_job_statuses().await?;
            self.view.show_status_view(&statuses);

            let snapshot = self.backend.fetch_graph().await?;
            if !snapshot.nodes.is_empty() {
                return self.apply_snapshot(snapshot);
            }
            log::debug!("Still no artifacts; polling again in {:?}.", self.poll_interval);
        }
    }

    /// Rebuilds the graph store from a snapshot, then renders and switches
    /// the graph view on. The store is only swapped once the whole
    /// snapshot translated cleanly.
    fn apply_snapshot(&mut self, snapshot: GraphSnapshotDto) -> Result<()> {
        let mut store = GraphStore::new();

        for raw in &snapshot.nodes {
            let group = NodeGroup::from_str(&raw.0)?;
            store.add_node(Node { id: raw.2.clone(), group, label: raw.3.clone(), artifact_type: raw.1.clone() });
        }
        for raw in &snapshot.edges {
            store.add_edge(&raw.0, &raw.1)?;
        }

        log::info!("Graph initialized with {} nodes and {} edges.", store.node_count(), store.edge_count());
        self.store = store;
        self.render_current();
        self.view.show_graph_view();
        Ok(())
    }

    /// Adds a job running `command_id` to the workflow.
    ///
    /// The first job creates the workflow itself; later jobs are patched
    /// onto it. Required-parameter values holding a `source:output`
    /// reference become connections rather than literals. On any backend
    /// error the graph is left untouched.
    pub async fn add_job(
        &mut self,
        command_id: i64,
        parameter_set_id: i64,
        required: &HashMap<String, String>,
        optional: &HashMap<String, String>,
    ) -> Result<String> {
        let (literals, connections) = split_required(required);

        let result = match self.workflow_id.clone() {
            None => {
                // First job: flatten everything (connections keep their raw
                // "source:output" form) and let the backend create the
                // workflow around it.
                let mut params: HashMap<String, String> = required.clone();
                params.extend(optional.clone());

                match self.backend.create_workflow(command_id, &params).await {
                    Ok((workflow_id, job)) => {
                        log::info!("Workflow '{}' created by job '{}'.", workflow_id, job.id);
                        self.workflow_id = Some(workflow_id);
                        let inputs = job.inputs.clone();
                        Ok((job, inputs))
                    }
                    Err(e) => Err(e),
                }
            }
            Some(workflow_id) => {
                let value = AddJobValueDto {
                    dflt_params: parameter_set_id,
                    connections,
                    req_params: literals,
                    opt_params: optional.clone(),
                };

                match self.backend.add_job(&workflow_id, value).await {
                    // The add response does not echo inputs back; they are
                    // synthesized from the required values.
                    Ok(job) => {
                        let inputs = self.synthesize_inputs(required);
                        Ok((job, inputs))
                    }
                    Err(e) => Err(e),
                }
            }
        };

        match result {
            Ok((job, inputs)) => {
                let job_id = job.id.clone();
                self.insert_job(&job, &inputs)?;
                self.in_construction += 1;
                self.view.set_submit_enabled(true);
                self.render_current();
                Ok(job_id)
            }
            Err(e) => {
                self.view.alert(AlertLevel::Danger, &e.to_string());
                Err(e)
            }
        }
    }

    /// Maps required-parameter values onto graph node ids feeding the new
    /// job: a connection prefers its output placeholder (`source:output`)
    /// and falls back to the source itself; a literal counts only if it
    /// names a node (artifact ids do, plain values like `"16"` do not).
    fn synthesize_inputs(&self, required: &HashMap<String, String>) -> Vec<String> {
        let mut inputs = Vec::new();
        for value in required.values() {
            let candidate = match ParamValue::classify(value) {
                ParamValue::Connection { source, output } => {
                    let placeholder = format!("{}:{}", source, output);
                    if self.store.contains_node(&placeholder) { placeholder } else { source }
                }
                ParamValue::Literal(literal) => literal,
            };
            if self.store.contains_node(&candidate) {
                inputs.push(candidate);
            }
        }
        inputs.sort();
        inputs
    }

    /// Inserts an accepted job: its node, one edge per input, and a
    /// placeholder node per declared output.
    fn insert_job(&mut self, job: &JobDto, inputs: &[String]) -> Result<()> {
        self.store.add_node(Node::job(&job.id, &job.label));

        for input in inputs {
            if !self.store.contains_node(input) {
                log::warn!("Backend listed input '{}' which is not in the graph; skipping its edge.", input);
                continue;
            }
            self.store.add_edge(input, &job.id)?;
        }

        for output in &job.outputs {
            let placeholder = Node::output_placeholder(&job.id, &output.0, &output.1);
            let placeholder_id = placeholder.id.clone();
            self.store.add_node(placeholder);
            self.store.add_edge(&job.id, &placeholder_id)?;
        }

        Ok(())
    }

    /// Removes an in-construction job and everything downstream of it.
    ///
    /// Destructive, so the view is asked for confirmation first; returns
    /// `Ok(false)` when the user declines. The backend removal must
    /// succeed before any local cleanup happens.
    pub async fn remove_job(&mut self, job_id: &str) -> Result<bool> {
        if !self.view.confirm_removal(job_id) {
            log::debug!("Removal of job '{}' cancelled by the user.", job_id);
            return Ok(false);
        }

        let workflow_id = self.workflow_id.clone().ok_or(Error::WorkflowNotCreated)?;

        if let Err(e) = self.backend.remove_job(&workflow_id, job_id).await {
            self.view.alert(AlertLevel::Danger, &e.to_string());
            return Err(e);
        }

        self.in_construction = self.in_construction.saturating_sub(1);
        if self.in_construction == 0 {
            self.view.set_submit_enabled(false);
        }

        let removed = self.store.remove_cascade(job_id);
        log::info!("Removed job '{}' and {} downstream node(s).", job_id, removed.len().saturating_sub(1));
        self.render_current();
        Ok(true)
    }

    /// Submits the workflow for execution. Outcome is reported as a
    /// notification only; job statuses are tracked elsewhere.
    pub async fn run_workflow(&mut self) -> Result<()> {
        let workflow_id = self.workflow_id.clone().ok_or(Error::WorkflowNotCreated)?;

        match self.backend.run_workflow(&workflow_id).await {
            Ok(()) => {
                self.view.alert(AlertLevel::Success, "Workflow submitted for execution.");
                Ok(())
            }
            Err(e) => {
                self.view.alert(AlertLevel::Danger, &e.to_string());
                Err(e)
            }
        }
    }

    /// Commands applicable to the selected artifact nodes. Commands that
    /// declare no outputs cannot extend the graph and are dropped.
    pub async fn commands_for_selection(
        &self,
        selection: &[String],
        include_analysis: bool,
    ) -> Result<Vec<CommandDto>> {
        let artifact_types = self.store.artifact_types(selection)?;
        let mut commands = self.backend.list_commands(&artifact_types, include_analysis).await?;
        commands.retain(|c| !c.output.is_empty());
        Ok(commands)
    }

    /// Parameter form for a command: widgets derived from the declared
    /// kinds plus the named default parameter sets. An unrecognized kind
    /// is a hard error telling the user to report the mismatch.
    pub async fn command_form(&self, command_id: i64) -> Result<CommandForm> {
        let schema = self.backend.fetch_command_options(command_id).await?;

        let mut widgets = Vec::new();
        for (options, required) in [(&schema.req_options, true), (&schema.opt_options, false)] {
            let mut names: Vec<&String> = options.keys().collect();
            names.sort();
            for name in names {
                let kind = match ParameterKind::parse(&options[name]) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.view.alert(AlertLevel::Danger, &e.to_string());
                        return Err(e);
                    }
                };
                widgets.push(ParameterWidget { name: name.clone(), widget: kind.widget(), required });
            }
        }

        Ok(CommandForm { widgets, parameter_sets: schema.options })
    }

    /// Job-selection callback: detail view of one job.
    pub async fn job_details(&self, job_id: &str) -> Result<JobDetailDto> {
        self.backend.fetch_job_detail(job_id).await
    }

    /// Artifact-selection callback: rendered summary of one artifact.
    pub async fn artifact_summary(&self, artifact_id: &str) -> Result<String> {
        self.backend.fetch_artifact_summary(artifact_id).await
    }

    fn render_current(&self) {
        self.view.render(&self.store.node_list(), &self.store.edge_list());
    }
}
