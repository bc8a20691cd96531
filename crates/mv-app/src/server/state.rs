use std::sync::Arc;

use crate::orchestrator::Orchestrator;

pub struct ServerState {
    pub orchestrator: Arc<Orchestrator>,
}

impl ServerState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}
