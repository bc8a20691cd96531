use mv_core::{JobStatus, ReferenceBundle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    pub prompt: String,
    /// Wallet address; absent or blank means guest
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub bundle: ReferenceBundle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressResponse {
    pub project_id: String,
    pub status: JobStatus,
    pub completed: usize,
    pub total: usize,
}
