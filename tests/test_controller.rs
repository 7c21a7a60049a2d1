use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use processing_network::api::backend_mock::MockBackend;
use processing_network::api::command_dto::{CommandDto, ParameterSchemaDto, ParameterSetDto};
use processing_network::api::graph_dto::{GraphSnapshotDto, RawEdgeDto, RawNodeDto};
use processing_network::api::job_dto::{JobDto, JobStatusDto, OutputDto};
use processing_network::controller::controller::{Initialization, WorkflowGraphController};
use processing_network::controller::params::WidgetKind;
use processing_network::controller::view::{AlertLevel, GraphView};
use processing_network::graph::edge::Edge;
use processing_network::graph::node::Node;

/// View that records every controller-driven effect for the assertions.
struct RecordingView {
    renders: Mutex<Vec<(usize, usize)>>,
    graph_view_shown: AtomicUsize,
    status_views_shown: AtomicUsize,
    submit_states: Mutex<Vec<bool>>,
    alerts: Mutex<Vec<(AlertLevel, String)>>,
    confirm_removals: AtomicBool,
}

impl RecordingView {
    fn new() -> RecordingView {
        RecordingView {
            renders: Mutex::new(Vec::new()),
            graph_view_shown: AtomicUsize::new(0),
            status_views_shown: AtomicUsize::new(0),
            submit_states: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
            confirm_removals: AtomicBool::new(true),
        }
    }

    fn last_alert(&self) -> Option<(AlertLevel, String)> {
        self.alerts.lock().unwrap().last().cloned()
    }

    fn last_submit_state(&self) -> Option<bool> {
        self.submit_states.lock().unwrap().last().copied()
    }
}

impl GraphView for RecordingView {
    fn render(&self, nodes: &[Node], edges: &[Edge]) {
        self.renders.lock().unwrap().push((nodes.len(), edges.len()));
    }

    fn show_graph_view(&self) {
        self.graph_view_shown.fetch_add(1, Ordering::SeqCst);
    }

    fn show_status_view(&self, _statuses: &HashMap<String, JobStatusDto>) {
        self.status_views_shown.fetch_add(1, Ordering::SeqCst);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.submit_states.lock().unwrap().push(enabled);
    }

    fn alert(&self, level: AlertLevel, message: &str) {
        self.alerts.lock().unwrap().push((level, message.to_string()));
    }

    fn confirm_removal(&self, _job_id: &str) -> bool {
        self.confirm_removals.load(Ordering::SeqCst)
    }
}

fn create_controller() -> (Arc<MockBackend>, Arc<RecordingView>, WorkflowGraphController) {
    let backend = Arc::new(MockBackend::new());
    let view = Arc::new(RecordingView::new());
    let controller = WorkflowGraphController::new(backend.clone(), view.clone());
    (backend, view, controller)
}

fn single_artifact_snapshot() -> GraphSnapshotDto {
    GraphSnapshotDto {
        nodes: vec![RawNodeDto("artifact".to_string(), Some("FASTQ".to_string()), "A1".to_string(), "Raw data".to_string())],
        edges: vec![],
    }
}

fn artifact_and_job_snapshot() -> GraphSnapshotDto {
    GraphSnapshotDto {
        nodes: vec![
            RawNodeDto("artifact".to_string(), Some("FASTQ".to_string()), "A1".to_string(), "Raw data".to_string()),
            RawNodeDto("job".to_string(), None, "J1".to_string(), "Split libraries".to_string()),
        ],
        edges: vec![RawEdgeDto("A1".to_string(), "J1".to_string())],
    }
}

fn split_libraries_job() -> JobDto {
    JobDto {
        id: "J1".to_string(),
        label: "Split libraries".to_string(),
        inputs: vec!["A1".to_string()],
        outputs: vec![OutputDto("demuxed".to_string(), "Demultiplexed".to_string())],
    }
}

/// Drives the controller through workflow creation so later tests can
/// exercise the incremental paths on top of it.
async fn add_first_job(backend: &MockBackend, controller: &mut WorkflowGraphController) -> String {
    *backend.create_workflow_reply.lock().unwrap() = Some(Ok(("wf1".to_string(), split_libraries_job())));

    let mut required = HashMap::new();
    required.insert("input_data".to_string(), "A1".to_string());

    controller.add_job(1, 1, &required, &HashMap::new()).await.expect("scripted creation must succeed")
}

#[test]
fn test_empty_snapshot_enters_polling_mode() {
    let (_backend, view, mut controller) = create_controller();

    let outcome = controller.initialize(GraphSnapshotDto::default()).unwrap();

    assert_eq!(outcome, Initialization::Pending);
    assert!(controller.graph().is_empty(), "nothing may be drawn from an empty snapshot");
    assert!(view.renders.lock().unwrap().is_empty());
    assert_eq!(view.graph_view_shown.load(Ordering::SeqCst), 0);
}

#[test]
fn test_snapshot_with_nodes_is_rendered() {
    let (_backend, view, mut controller) = create_controller();

    let outcome = controller.initialize(artifact_and_job_snapshot()).unwrap();

    assert_eq!(outcome, Initialization::Rendered);
    assert_eq!(controller.graph().node_count(), 2);
    assert_eq!(controller.graph().edge_count(), 1);
    assert_eq!(view.graph_view_shown.load(Ordering::SeqCst), 1, "the view toggle happens exactly once");
    assert_eq!(view.renders.lock().unwrap().as_slice(), &[(2, 1)]);
}

#[test]
fn test_snapshot_with_unknown_group_is_rejected() {
    let (_backend, view, mut controller) = create_controller();

    let snapshot = GraphSnapshotDto {
        nodes: vec![RawNodeDto("blob".to_string(), None, "X1".to_string(), "What".to_string())],
        edges: vec![],
    };

    assert!(controller.initialize(snapshot).is_err());
    assert!(controller.graph().is_empty(), "a snapshot that fails to translate must not replace the graph");
    assert_eq!(view.graph_view_shown.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_start_polls_until_artifacts_exist() {
    let (backend, view, controller) = create_controller();
    let mut controller = controller.with_poll_interval(Duration::from_millis(1));

    // Initial fetch and first poll see nothing; the second poll delivers.
    backend.push_graph(GraphSnapshotDto::default());
    backend.push_graph(GraphSnapshotDto::default());
    backend.push_graph(artifact_and_job_snapshot());
    backend.push_statuses(HashMap::from([(
        "J0".to_string(),
        JobStatusDto { status: "running".to_string(), step: Some("demultiplexing".to_string()), error: None },
    )]));

    controller.start().await.unwrap();

    assert_eq!(controller.graph().node_count(), 2);
    assert_eq!(view.graph_view_shown.load(Ordering::SeqCst), 1);
    assert!(
        view.status_views_shown.load(Ordering::SeqCst) >= 1,
        "the status panel must be fed while the graph is still empty"
    );
}

#[tokio::test]
async fn test_first_job_creates_the_workflow() {
    let (backend, view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();

    let job_id = add_first_job(&backend, &mut controller).await;

    assert_eq!(job_id, "J1");
    assert_eq!(controller.workflow_id(), Some("wf1"));
    assert_eq!(controller.in_construction(), 1);
    assert!(controller.can_submit());
    assert_eq!(view.last_submit_state(), Some(true));

    let graph = controller.graph();
    assert!(graph.contains_node("J1"));
    assert!(graph.contains_node("J1:demuxed"), "declared outputs become placeholder nodes");
    assert_eq!(graph.edges_to("J1").len(), 1, "one edge per declared input");
    assert_eq!(graph.edges_from("J1").len(), 1, "one edge per declared output");

    let calls = backend.calls.lock().unwrap();
    assert!(calls.iter().any(|c| c.starts_with("create_workflow")), "the first job must go through workflow creation");
    assert!(!calls.iter().any(|c| c.starts_with("add_job")));
}

#[tokio::test]
async fn test_add_job_failure_leaves_the_graph_unchanged() {
    let (backend, view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    *backend.create_workflow_reply.lock().unwrap() = Some(Err("boom".to_string()));

    let mut required = HashMap::new();
    required.insert("input_data".to_string(), "A1".to_string());

    let result = controller.add_job(1, 1, &required, &HashMap::new()).await;

    assert!(result.is_err());
    assert_eq!(controller.graph().node_count(), 1, "no partial insertion on a backend error");
    assert_eq!(controller.graph().edge_count(), 0);
    assert_eq!(controller.in_construction(), 0);
    assert_eq!(controller.workflow_id(), None);
    assert_eq!(view.last_alert(), Some((AlertLevel::Danger, "boom".to_string())), "the message is surfaced verbatim");
}

#[tokio::test]
async fn test_second_job_is_patched_with_a_connection() {
    let (backend, _view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    add_first_job(&backend, &mut controller).await;

    *backend.add_job_reply.lock().unwrap() = Some(Ok(JobDto {
        id: "J2".to_string(),
        label: "Pick OTUs".to_string(),
        inputs: vec![],
        outputs: vec![OutputDto("otu_table".to_string(), "BIOM".to_string())],
    }));

    let mut required = HashMap::new();
    required.insert("input_data".to_string(), "J1:demuxed".to_string());

    let job_id = controller.add_job(2, 7, &required, &HashMap::new()).await.unwrap();

    assert_eq!(job_id, "J2");
    assert_eq!(controller.in_construction(), 2);

    let graph = controller.graph();
    assert!(graph.contains_node("J2:otu_table"));
    let inbound = graph.edge_list().into_iter().filter(|e| e.to == "J2").collect::<Vec<_>>();
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].from, "J1:demuxed", "the connection must hang off the output placeholder");

    let calls = backend.calls.lock().unwrap();
    assert!(calls.iter().any(|c| c.starts_with("add_job(wf1")), "later jobs go through the incremental patch");
}

#[tokio::test]
async fn test_add_then_remove_restores_the_previous_graph() {
    let (backend, view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    add_first_job(&backend, &mut controller).await;

    let removed = controller.remove_job("J1").await.unwrap();

    assert!(removed);
    assert_eq!(controller.graph().node_count(), 1, "only the pre-add artifact may remain");
    assert_eq!(controller.graph().edge_count(), 0);
    assert!(controller.graph().contains_node("A1"));
    assert_eq!(controller.in_construction(), 0);
    assert!(!controller.can_submit());
    assert_eq!(view.last_submit_state(), Some(false), "submission is disabled once nothing is in construction");
}

#[tokio::test]
async fn test_remove_job_takes_downstream_consumers_with_it() {
    let (backend, _view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    add_first_job(&backend, &mut controller).await;

    *backend.add_job_reply.lock().unwrap() = Some(Ok(JobDto {
        id: "J2".to_string(),
        label: "Pick OTUs".to_string(),
        inputs: vec![],
        outputs: vec![OutputDto("otu_table".to_string(), "BIOM".to_string())],
    }));
    let mut required = HashMap::new();
    required.insert("input_data".to_string(), "J1:demuxed".to_string());
    controller.add_job(2, 7, &required, &HashMap::new()).await.unwrap();

    controller.remove_job("J1").await.unwrap();

    let graph = controller.graph();
    for id in ["J1", "J1:demuxed", "J2", "J2:otu_table"] {
        assert!(!graph.contains_node(id), "'{}' is downstream of J1 and must be gone", id);
    }
    assert!(graph.contains_node("A1"));
    for edge in graph.edge_list() {
        assert!(graph.contains_node(&edge.from) && graph.contains_node(&edge.to), "no dangling edges after removal");
    }
}

#[tokio::test]
async fn test_declined_confirmation_aborts_the_removal() {
    let (backend, view, mut controller) = create_controller();
    view.confirm_removals.store(false, Ordering::SeqCst);
    controller.initialize(single_artifact_snapshot()).unwrap();
    add_first_job(&backend, &mut controller).await;

    let removed = controller.remove_job("J1").await.unwrap();

    assert!(!removed);
    assert!(controller.graph().contains_node("J1"), "a declined removal must not touch the graph");
    assert_eq!(controller.in_construction(), 1);
    assert!(
        !backend.calls.lock().unwrap().iter().any(|c| c.starts_with("remove_job")),
        "no request may be issued without confirmation"
    );
}

#[tokio::test]
async fn test_remove_job_backend_error_leaves_the_graph_unchanged() {
    let (backend, view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    add_first_job(&backend, &mut controller).await;
    *backend.remove_job_error.lock().unwrap() = Some("job already queued".to_string());

    let result = controller.remove_job("J1").await;

    assert!(result.is_err());
    assert!(controller.graph().contains_node("J1"));
    assert!(controller.graph().contains_node("J1:demuxed"));
    assert_eq!(controller.in_construction(), 1);
    assert_eq!(view.last_alert(), Some((AlertLevel::Danger, "job already queued".to_string())));
}

#[tokio::test]
async fn test_run_workflow_requires_a_workflow() {
    let (_backend, _view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();

    assert!(controller.run_workflow().await.is_err());
}

#[tokio::test]
async fn test_run_workflow_reports_the_outcome_without_touching_the_graph() {
    let (backend, view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    add_first_job(&backend, &mut controller).await;
    let nodes_before = controller.graph().node_count();

    controller.run_workflow().await.unwrap();
    assert_eq!(view.last_alert().map(|(level, _)| level), Some(AlertLevel::Success));

    *backend.run_workflow_error.lock().unwrap() = Some("no jobs to run".to_string());
    assert!(controller.run_workflow().await.is_err());
    assert_eq!(view.last_alert(), Some((AlertLevel::Danger, "no jobs to run".to_string())));

    assert_eq!(controller.graph().node_count(), nodes_before, "running never mutates the graph");
}

#[tokio::test]
async fn test_command_menu_drops_commands_without_outputs() {
    let (backend, _view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    *backend.commands.lock().unwrap() = vec![
        CommandDto {
            id: 1,
            command: "Split libraries".to_string(),
            output: vec![OutputDto("demuxed".to_string(), "Demultiplexed".to_string())],
        },
        CommandDto { id: 2, command: "Validate".to_string(), output: vec![] },
    ];

    let commands = controller.commands_for_selection(&["A1".to_string()], false).await.unwrap();

    assert_eq!(commands.len(), 1, "a command without outputs cannot extend the graph");
    assert_eq!(commands[0].id, 1);
    assert!(
        backend.calls.lock().unwrap().iter().any(|c| c == "list_commands(FASTQ, false)"),
        "the distinct artifact types of the selection form the query"
    );
}

#[tokio::test]
async fn test_command_form_derives_widgets() {
    let (backend, _view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    *backend.command_options.lock().unwrap() = Some(ParameterSchemaDto {
        req_options: HashMap::from([
            ("input_data".to_string(), "artifact".to_string()),
            ("barcode_type".to_string(), r#"choice:["golay_12", "hamming_8"]"#.to_string()),
        ]),
        opt_options: HashMap::from([
            ("max_bad_run_length".to_string(), "integer".to_string()),
            ("rev_comp".to_string(), "boolean".to_string()),
        ]),
        options: vec![ParameterSetDto { id: 1, name: "Defaults".to_string(), values: HashMap::new() }],
    });

    let form = controller.command_form(1).await.unwrap();

    assert_eq!(form.parameter_sets.len(), 1);
    assert_eq!(form.widgets.len(), 4);

    let required: Vec<&str> =
        form.widgets.iter().filter(|w| w.required).map(|w| w.name.as_str()).collect();
    assert_eq!(required, vec!["barcode_type", "input_data"], "required parameters come first, sorted");

    let input = form.widgets.iter().find(|w| w.name == "input_data").unwrap();
    assert_eq!(input.widget, WidgetKind::ArtifactDropdown);
    let barcode = form.widgets.iter().find(|w| w.name == "barcode_type").unwrap();
    assert_eq!(
        barcode.widget,
        WidgetKind::Dropdown(vec!["golay_12".to_string(), "hamming_8".to_string()])
    );
    let rev_comp = form.widgets.iter().find(|w| w.name == "rev_comp").unwrap();
    assert_eq!(rev_comp.widget, WidgetKind::Checkbox);
}

#[tokio::test]
async fn test_selection_callbacks_fetch_details() {
    let (backend, _view, mut controller) = create_controller();
    controller.initialize(artifact_and_job_snapshot()).unwrap();
    backend.job_details.lock().unwrap().insert(
        "J1".to_string(),
        processing_network::api::job_dto::JobDetailDto {
            job_id: "J1".to_string(),
            job_status: "queued".to_string(),
            job_parameters: HashMap::new(),
        },
    );
    backend.artifact_summaries.lock().unwrap().insert("A1".to_string(), "<b>42 samples</b>".to_string());

    let detail = controller.job_details("J1").await.unwrap();
    assert_eq!(detail.job_status, "queued");

    let summary = controller.artifact_summary("A1").await.unwrap();
    assert_eq!(summary, "<b>42 samples</b>");
}

#[tokio::test]
async fn test_command_form_rejects_unknown_parameter_kinds() {
    let (backend, view, mut controller) = create_controller();
    controller.initialize(single_artifact_snapshot()).unwrap();
    *backend.command_options.lock().unwrap() = Some(ParameterSchemaDto {
        req_options: HashMap::from([("weights".to_string(), "tensor".to_string())]),
        opt_options: HashMap::new(),
        options: vec![],
    });

    let result = controller.command_form(1).await;

    assert!(result.is_err());
    let (level, message) = view.last_alert().expect("a version mismatch must be surfaced, not swallowed");
    assert_eq!(level, AlertLevel::Danger);
    assert!(message.contains("tensor"));
}
