use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use mv_core::{OwnerKey, ProvenanceRecord};

use crate::error::AppError;
use crate::job::{JobSnapshot, JobSummary};
use crate::server::schemas::{CreateJobRequest, ProgressResponse};
use crate::server::state::ServerState;

pub async fn create_job(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobSummary>), AppError> {
    let owner = OwnerKey::parse(req.owner.as_deref().unwrap_or_default());
    let job = state.orchestrator.start(owner, req.prompt, req.bundle).await?;
    Ok((StatusCode::CREATED, Json(job.summary())))
}

pub async fn list_jobs(State(state): State<Arc<ServerState>>) -> Json<Vec<JobSummary>> {
    Json(state.orchestrator.list().await)
}

pub async fn get_job(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<JobSnapshot>, AppError> {
    Ok(Json(state.orchestrator.snapshot(&id).await?))
}

pub async fn get_progress(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, AppError> {
    let job = state.orchestrator.get(&id).await?;
    let (completed, total) = job.progress();
    Ok(Json(ProgressResponse {
        project_id: id,
        status: job.status(),
        completed,
        total,
    }))
}

pub async fn pause_job(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<JobSummary>, AppError> {
    Ok(Json(state.orchestrator.pause(&id).await?))
}

pub async fn resume_job(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<JobSummary>, AppError> {
    Ok(Json(state.orchestrator.resume(&id).await?))
}

pub async fn stop_job(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<JobSummary>, AppError> {
    Ok(Json(state.orchestrator.stop(&id).await?))
}

pub async fn fallback_history(State(state): State<Arc<ServerState>>) -> Json<Vec<ProvenanceRecord>> {
    Json(state.orchestrator.fallback_history())
}
