use std::sync::Arc;

use crate::api::backend::HttpBackend;
use crate::controller::controller::WorkflowGraphController;
use crate::controller::view::GraphView;
use crate::error::Result;

pub mod api;
pub mod controller;
pub mod error;
pub mod graph;
pub mod logger;

/// Builds a controller talking HTTP to the processing backend at
/// `base_url`, rendering into `view`.
pub fn connect(base_url: &str, view: Arc<dyn GraphView>) -> Result<WorkflowGraphController> {
    let backend = Arc::new(HttpBackend::new(base_url)?);
    log::info!("Backend client created for '{}'.", base_url);

    Ok(WorkflowGraphController::new(backend, view))
}
