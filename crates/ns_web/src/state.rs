use std::sync::Arc;

use ns_inference::SummaryOrchestrator;

pub struct AppState {
    pub orchestrator: Arc<SummaryOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: SummaryOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
