mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use log::info;
use tokio::net::TcpListener;

use crate::orchestrator::Orchestrator;
use crate::server::routes::api_routes;

pub use schemas::{CreateJobRequest, ProgressResponse};
pub use state::ServerState;

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .merge(api_routes())
        .with_state(Arc::new(ServerState::new(orchestrator)))
}

/// Serve the control API until the listener fails
pub async fn serve(port: u16, orchestrator: Arc<Orchestrator>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting control server on port {}", port);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(orchestrator)).await?;
    Ok(())
}
