use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use mv_core::{JobStatus, OwnerKey, ProvenanceRecord, ReferenceBundle};
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::generator::ArtifactGenerator;
use crate::job::{GenerationJob, JobSnapshot, JobSummary};
use crate::provenance::ProvenanceStore;

/// Registry of generation jobs keyed by project id.
///
/// Finished jobs are kept for inspection.
pub struct Orchestrator {
    generator: Arc<dyn ArtifactGenerator>,
    provenance: Arc<ProvenanceStore>,
    jobs: RwLock<HashMap<String, Arc<GenerationJob>>>,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn ArtifactGenerator>, provenance: Arc<ProvenanceStore>) -> Self {
        Self {
            generator,
            provenance,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Create a job and start both of its workers
    pub async fn start(
        &self,
        owner: OwnerKey,
        prompt: impl Into<String>,
        bundle: ReferenceBundle,
    ) -> Result<Arc<GenerationJob>, AppError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(AppError::InvalidRequest("prompt must not be empty".into()));
        }

        let job = Arc::new(GenerationJob::new(
            owner,
            prompt,
            bundle,
            Arc::clone(&self.generator),
            Arc::clone(&self.provenance),
        ));
        job.start()?;

        info!("Registered job {}", job.project_id());
        self.jobs
            .write()
            .await
            .insert(job.project_id().to_string(), Arc::clone(&job));
        Ok(job)
    }

    pub async fn get(&self, project_id: &str) -> Result<Arc<GenerationJob>, AppError> {
        self.jobs
            .read()
            .await
            .get(project_id)
            .cloned()
            .ok_or_else(|| AppError::JobNotFound(project_id.to_string()))
    }

    pub async fn pause(&self, project_id: &str) -> Result<JobSummary, AppError> {
        let job = self.get(project_id).await?;
        job.pause()?;
        Ok(job.summary())
    }

    pub async fn resume(&self, project_id: &str) -> Result<JobSummary, AppError> {
        let job = self.get(project_id).await?;
        job.resume()?;
        Ok(job.summary())
    }

    pub async fn stop(&self, project_id: &str) -> Result<JobSummary, AppError> {
        let job = self.get(project_id).await?;
        job.stop()?;
        Ok(job.summary())
    }

    pub async fn progress(&self, project_id: &str) -> Result<(usize, usize), AppError> {
        Ok(self.get(project_id).await?.progress())
    }

    pub async fn status(&self, project_id: &str) -> Result<JobStatus, AppError> {
        Ok(self.get(project_id).await?.status())
    }

    pub async fn snapshot(&self, project_id: &str) -> Result<JobSnapshot, AppError> {
        Ok(self.get(project_id).await?.snapshot())
    }

    /// Summaries of every known job, newest first
    pub async fn list(&self) -> Vec<JobSummary> {
        let mut summaries: Vec<JobSummary> = self
            .jobs
            .read()
            .await
            .values()
            .map(|job| job.summary())
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    pub fn fallback_history(&self) -> Vec<ProvenanceRecord> {
        self.provenance.fallback_history()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use mv_core::{AssetRef, SLOT_COUNT};

    use super::*;
    use crate::error::GenerationError;

    struct EchoGenerator;

    #[async_trait]
    impl ArtifactGenerator for EchoGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _reference_urls: &[String],
        ) -> Result<AssetRef, GenerationError> {
            tokio::time::sleep(Duration::from_millis(2)).await;
            Ok(AssetRef::new("https://cdn/echo.png"))
        }
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            Arc::new(EchoGenerator),
            Arc::new(ProvenanceStore::local_only()),
        )
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let orch = orchestrator();
        assert!(matches!(orch.pause("nope").await, Err(AppError::JobNotFound(_))));
        assert!(matches!(orch.progress("nope").await, Err(AppError::JobNotFound(_))));
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected() {
        let orch = orchestrator();
        let result = orch.start(OwnerKey::Guest, "   ", ReferenceBundle::new()).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(orch.list().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_control_surface_round_trip() {
        let orch = orchestrator();
        let job = orch
            .start(OwnerKey::Guest, "cat", ReferenceBundle::new())
            .await
            .unwrap();
        let id = job.project_id().to_string();

        tokio::time::timeout(Duration::from_secs(10), job.wait())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(orch.status(&id).await.unwrap(), JobStatus::Completed);
        assert_eq!(orch.progress(&id).await.unwrap(), (SLOT_COUNT, SLOT_COUNT));
        assert!(matches!(
            orch.pause(&id).await,
            Err(AppError::InvalidTransition { .. })
        ));
        assert_eq!(orch.snapshot(&id).await.unwrap().slots.len(), SLOT_COUNT);
        assert_eq!(orch.fallback_history().len(), SLOT_COUNT);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_list_is_newest_first() {
        let orch = orchestrator();
        let first = orch
            .start(OwnerKey::Guest, "first", ReferenceBundle::new())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = orch
            .start(OwnerKey::parse("0x1234567890"), "second", ReferenceBundle::new())
            .await
            .unwrap();

        let listed = orch.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].project_id, second.project_id());
        assert_eq!(listed[1].project_id, first.project_id());

        orch.stop(first.project_id()).await.ok();
        orch.stop(second.project_id()).await.ok();
    }
}
