use std::collections::HashMap;

use crate::api::job_dto::JobStatusDto;
use crate::graph::edge::Edge;
use crate::graph::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Danger,
}

/// Rendering surface the controller drives.
///
/// The controller owns the graph and decides *when* something is shown;
/// the view decides *how*. Views must not mutate the graph — they only
/// get snapshots to draw.
pub trait GraphView: Send + Sync {
    /// Redraw from the given node/edge snapshot.
    fn render(&self, nodes: &[Node], edges: &[Edge]);

    /// Switch from the job-status panel to the graph.
    fn show_graph_view(&self);

    /// Show per-job statuses while the backend is still computing the
    /// initial artifacts.
    fn show_status_view(&self, statuses: &HashMap<String, JobStatusDto>);

    /// Enable or disable workflow submission.
    fn set_submit_enabled(&self, enabled: bool);

    /// Transient user notification; backend error messages pass through
    /// verbatim.
    fn alert(&self, level: AlertLevel, message: &str);

    /// Ask the user to confirm removing a job and everything downstream
    /// of it. Returning false aborts the removal.
    fn confirm_removal(&self, job_id: &str) -> bool;
}
