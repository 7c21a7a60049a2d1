use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use processing_network::api::job_dto::JobStatusDto;
use processing_network::controller::view::{AlertLevel, GraphView};
use processing_network::graph::edge::Edge;
use processing_network::graph::node::{Node, NodeGroup};
use processing_network::logger;

/// Connects to a processing backend, loads (or waits for) the workflow
/// graph, and prints a summary of it.
#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the processing backend.
    #[arg(long)]
    backend_url: String,

    /// Seconds between status polls while the graph is empty.
    #[arg(long, default_value_t = 5)]
    poll_secs: u64,
}

/// Headless view: renders by logging. Removal confirmations are always
/// granted since nothing destructive is triggered from this binary.
struct ConsoleView;

impl GraphView for ConsoleView {
    fn render(&self, nodes: &[Node], edges: &[Edge]) {
        log::info!("Graph: {} node(s), {} edge(s).", nodes.len(), edges.len());
        for node in nodes {
            log::debug!("  node [{:?}] {} ({})", node.group, node.id, node.label);
        }
        for edge in edges {
            log::debug!("  edge #{} {} -> {}", edge.id, edge.from, edge.to);
        }
    }

    fn show_graph_view(&self) {
        log::info!("Switching to graph view.");
    }

    fn show_status_view(&self, statuses: &HashMap<String, JobStatusDto>) {
        for (job_id, status) in statuses {
            match &status.error {
                Some(error) => log::warn!("Job {}: {} ({})", job_id, status.status, error),
                None => log::info!("Job {}: {}{}", job_id, status.status, match &status.step {
                    Some(step) => format!(" [{}]", step),
                    None => String::new(),
                }),
            }
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        log::info!("Workflow submission {}.", if enabled { "enabled" } else { "disabled" });
    }

    fn alert(&self, level: AlertLevel, message: &str) {
        match level {
            AlertLevel::Danger => log::error!("{}", message),
            _ => log::info!("{}", message),
        }
    }

    fn confirm_removal(&self, _job_id: &str) -> bool {
        true
    }
}

#[tokio::main]
async fn main() {
    logger::init();

    let args = Args::parse();
    log::info!("Connecting to processing backend at '{}'...", args.backend_url);

    let view = Arc::new(ConsoleView);
    let controller = processing_network::connect(&args.backend_url, view);

    let mut controller = match controller {
        Ok(c) => c.with_poll_interval(Duration::from_secs(args.poll_secs)),
        Err(e) => {
            log::error!("Could not create the backend client: {}", e);
            return;
        }
    };

    match controller.start().await {
        Ok(()) => {
            let graph = controller.graph();
            log::info!(
                "Workflow graph loaded: {} artifact(s), {} job(s), {} output placeholder(s), {} edge(s).",
                graph.nodes_in_group(NodeGroup::Artifact).len(),
                graph.nodes_in_group(NodeGroup::Job).len(),
                graph.nodes_in_group(NodeGroup::Type).len(),
                graph.edge_count()
            );
        }
        Err(e) => {
            log::error!("Error while loading the workflow graph: {}", e);
        }
    }
}
