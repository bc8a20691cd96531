use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::server::routes::job::{
    create_job, fallback_history, get_job, get_progress, list_jobs, pause_job, resume_job,
    stop_job,
};
use crate::server::state::ServerState;

mod job;

pub fn api_routes() -> Router<Arc<ServerState>> {
    Router::new()
        .route("/jobs", post(create_job).get(list_jobs))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/{id}/progress", get(get_progress))
        .route("/jobs/{id}/pause", post(pause_job))
        .route("/jobs/{id}/resume", post(resume_job))
        .route("/jobs/{id}/stop", post(stop_job))
        .route("/provenance/fallback", get(fallback_history))
}
