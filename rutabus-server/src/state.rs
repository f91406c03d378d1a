//! Application state for the HTTP layer.

use std::sync::Arc;

use rutabus_core::{GraphService, Repository};

/// Repository behind the graph service, shared across handlers
pub type SharedRepository = Arc<dyn Repository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cached planning network
    pub service: Arc<GraphService<SharedRepository>>,
}

impl AppState {
    pub fn new(service: GraphService<SharedRepository>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
