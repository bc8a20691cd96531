use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{error, info};
use mv_core::prompt::compose;
use mv_core::{
    AssetRef, JobStatus, OwnerKey, ReferenceBundle, SLOT_COUNT, Slot, SlotOrdinal, SlotState,
};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::events::JobEvent;
use crate::generator::ArtifactGenerator;
use crate::provenance::ProvenanceStore;
use crate::worker::Worker;

/// Inclusive ordinal ranges, one per worker
pub const WORKER_RANGES: [(u8, u8); 2] = [(1, 5), (6, 10)];

const EVENT_CAPACITY: usize = 64;

/// Result of asking to begin a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    Started,
    Wait,
    Halt,
    Skip,
}

/// State shared between a job handle and its workers
pub(crate) struct JobShared {
    pub project_id: String,
    pub owner: OwnerKey,
    pub prompt: String,
    pub bundle: ReferenceBundle,
    pub created_at: DateTime<Utc>,
    prompts: Vec<String>,
    slots: Mutex<Vec<Slot>>,
    completed: AtomicUsize,
    status: watch::Sender<JobStatus>,
    exited: watch::Sender<bool>,
    events: broadcast::Sender<JobEvent>,
}

impl JobShared {
    fn new(owner: OwnerKey, prompt: String, bundle: ReferenceBundle) -> Self {
        let created_at = Utc::now();
        let project_id = project_id(&owner, created_at);
        let prompts = SlotOrdinal::all()
            .map(|ordinal| compose(&prompt, &bundle, &project_id, ordinal))
            .collect();
        let (status, _) = watch::channel(JobStatus::Idle);
        let (exited, _) = watch::channel(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            project_id,
            owner,
            prompt,
            bundle,
            created_at,
            prompts,
            slots: Mutex::new(SlotOrdinal::all().map(Slot::new).collect()),
            completed: AtomicUsize::new(0),
            status,
            exited,
            events,
        }
    }

    pub fn status(&self) -> JobStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<JobStatus> {
        self.status.subscribe()
    }

    pub fn subscribe_exited(&self) -> watch::Receiver<bool> {
        self.exited.subscribe()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn prompt_for(&self, ordinal: SlotOrdinal) -> &str {
        &self.prompts[ordinal.index()]
    }

    fn slots(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: JobEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Move to `to` if the current status is one of `from`
    fn transition(
        &self,
        action: &'static str,
        from: &[JobStatus],
        to: JobStatus,
    ) -> Result<(), AppError> {
        let mut outcome = Ok(());
        self.status.send_if_modified(|current| {
            if from.contains(current) {
                *current = to;
                true
            } else {
                outcome = Err(AppError::InvalidTransition {
                    action,
                    status: *current,
                });
                false
            }
        });
        outcome?;

        info!("Job {} is now {}", self.project_id, to);
        self.emit(JobEvent::StatusChanged {
            project_id: self.project_id.clone(),
            status: to,
        });
        Ok(())
    }

    /// Mark a slot InProgress if the job is running. The status is read under
    /// the slot lock so no slot begins once a pause or stop is visible.
    pub fn try_begin(&self, ordinal: SlotOrdinal) -> Gate {
        let mut slots = self.slots();
        match self.status() {
            JobStatus::Running => {}
            JobStatus::Paused => return Gate::Wait,
            _ => return Gate::Halt,
        }

        if let Err(e) = slots[ordinal.index()].begin() {
            error!("Job {}: {}", self.project_id, e);
            return Gate::Skip;
        }
        self.emit(JobEvent::SlotStarted {
            project_id: self.project_id.clone(),
            ordinal,
        });
        Gate::Started
    }

    /// Record a slot's terminal state and return the new completion count
    pub fn finish_slot(&self, ordinal: SlotOrdinal, outcome: Result<AssetRef, String>) -> usize {
        let mut slots = self.slots();
        let slot = &mut slots[ordinal.index()];

        let (transition, event) = match outcome {
            Ok(asset) => (slot.complete(asset.clone()), Ok(asset)),
            Err(reason) => (slot.fail(reason.clone()), Err(reason)),
        };
        if let Err(e) = transition {
            error!("Job {}: {}", self.project_id, e);
            return self.completed();
        }

        // Serialized by the slot lock; status flips before the count is visible
        let completed = self.completed() + 1;
        let all_done = completed == SLOT_COUNT
            && self.status.send_if_modified(|current| match *current {
                JobStatus::Running | JobStatus::Paused => {
                    *current = JobStatus::Completed;
                    true
                }
                _ => false,
            });
        self.completed.store(completed, Ordering::Release);

        let project_id = self.project_id.clone();
        self.emit(match event {
            Ok(asset) => JobEvent::SlotCompleted {
                project_id,
                ordinal,
                asset,
                completed,
            },
            Err(error) => JobEvent::SlotErrored {
                project_id,
                ordinal,
                error,
                completed,
            },
        });

        if all_done {
            info!("Job {} is now {}", self.project_id, JobStatus::Completed);
            self.emit(JobEvent::StatusChanged {
                project_id: self.project_id.clone(),
                status: JobStatus::Completed,
            });
        }
        completed
    }

    /// Settle the terminal status once every worker has returned. A job
    /// that already reached Completed keeps it.
    fn finish(&self) {
        let completed = self.completed();
        let mut settled = None;
        self.status.send_if_modified(|current| {
            let next = match *current {
                status if status.is_terminal() => return false,
                JobStatus::Running | JobStatus::Paused if completed == SLOT_COUNT => {
                    JobStatus::Completed
                }
                _ => JobStatus::Stopped,
            };
            *current = next;
            settled = Some(next);
            true
        });

        match settled {
            Some(JobStatus::Stopped) if completed < SLOT_COUNT => {
                let abandoned = self
                    .slots()
                    .iter()
                    .filter(|slot| !slot.state.is_terminal())
                    .count();
                info!(
                    "Job {} stopped with {}/{} slots done, {} never finished",
                    self.project_id, completed, SLOT_COUNT, abandoned
                );
            }
            Some(status) => {
                info!("Job {} is now {} ({}/{})", self.project_id, status, completed, SLOT_COUNT);
            }
            None => info!("Job {} workers exited ({}/{})", self.project_id, completed, SLOT_COUNT),
        }
        if let Some(status) = settled {
            self.emit(JobEvent::StatusChanged {
                project_id: self.project_id.clone(),
                status,
            });
        }
        self.exited.send_replace(true);
    }
}

/// `<owner prefix>-<unix millis>-<8 hex chars>`
fn project_id(owner: &OwnerKey, created_at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        owner.prefix(),
        created_at.timestamp_millis(),
        &suffix[..8]
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub project_id: String,
    pub owner: OwnerKey,
    pub status: JobStatus,
    pub completed: usize,
    pub total: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    #[serde(flatten)]
    pub summary: JobSummary,
    pub prompt: String,
    pub bundle: ReferenceBundle,
    pub slots: Vec<Slot>,
}

/// Ten-slot generation job driven by two workers.
///
/// Idle -> Running <-> Paused, then either Completed as soon as the tenth
/// slot is terminal, or Stopping -> Stopped after `stop()`.
pub struct GenerationJob {
    shared: Arc<JobShared>,
    generator: Arc<dyn ArtifactGenerator>,
    provenance: Arc<ProvenanceStore>,
}

impl GenerationJob {
    pub fn new(
        owner: OwnerKey,
        prompt: impl Into<String>,
        bundle: ReferenceBundle,
        generator: Arc<dyn ArtifactGenerator>,
        provenance: Arc<ProvenanceStore>,
    ) -> Self {
        Self {
            shared: Arc::new(JobShared::new(owner, prompt.into(), bundle)),
            generator,
            provenance,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.shared.project_id
    }

    pub fn owner(&self) -> &OwnerKey {
        &self.shared.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.shared.created_at
    }

    /// Spawn both workers. Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), AppError> {
        self.shared
            .transition("start", &[JobStatus::Idle], JobStatus::Running)?;
        info!(
            "Starting job {} for {} ({} references)",
            self.shared.project_id,
            self.shared.owner,
            self.shared.bundle.urls().len()
        );

        let handles: Vec<_> = WORKER_RANGES
            .iter()
            .enumerate()
            .map(|(i, &(first, last))| {
                let worker_id = i + 1;
                let worker = Worker::new(
                    worker_id,
                    SlotOrdinal::range(first, last).collect(),
                    Arc::clone(&self.shared),
                    Arc::clone(&self.generator),
                    Arc::clone(&self.provenance),
                );
                let span = tracing::info_span!(
                    "worker",
                    project_id = %self.shared.project_id,
                    worker_id
                );
                tokio::spawn(worker.run().instrument(span))
            })
            .collect();

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            for result in futures::future::join_all(handles).await {
                if let Err(e) = result {
                    error!("Worker for job {} exited abnormally: {}", shared.project_id, e);
                }
            }
            shared.finish();
        });

        Ok(())
    }

    /// No new slot begins until `resume()`; in-flight slots run to completion
    pub fn pause(&self) -> Result<(), AppError> {
        self.shared
            .transition("pause", &[JobStatus::Running], JobStatus::Paused)
    }

    pub fn resume(&self) -> Result<(), AppError> {
        self.shared
            .transition("resume", &[JobStatus::Paused], JobStatus::Running)
    }

    /// Request cooperative cancellation. The job becomes Stopped once both
    /// workers have finished their in-flight slot and returned.
    pub fn stop(&self) -> Result<(), AppError> {
        self.shared.transition(
            "stop",
            &[JobStatus::Running, JobStatus::Paused],
            JobStatus::Stopping,
        )
    }

    /// `(completed, total)`; errored slots count as completed
    pub fn progress(&self) -> (usize, usize) {
        (self.shared.completed(), SLOT_COUNT)
    }

    pub fn status(&self) -> JobStatus {
        self.shared.status()
    }

    pub fn slots(&self) -> Vec<Slot> {
        self.shared.slots().to_vec()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.shared.events.subscribe()
    }

    /// Resolve with the terminal status once both workers have exited
    pub async fn wait(&self) -> Result<JobStatus, AppError> {
        if self.shared.status() == JobStatus::Idle {
            return Err(AppError::NotStarted(self.shared.project_id.clone()));
        }

        let mut exited = self.shared.subscribe_exited();
        exited
            .wait_for(|done| *done)
            .await
            .map_err(|_| AppError::BackendError("job exit channel closed".into()))?;
        Ok(self.shared.status())
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            project_id: self.shared.project_id.clone(),
            owner: self.shared.owner.clone(),
            status: self.status(),
            completed: self.shared.completed(),
            total: SLOT_COUNT,
            created_at: self.shared.created_at,
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        let slots = self.slots();
        JobSnapshot {
            summary: self.summary(),
            prompt: self.shared.prompt.clone(),
            bundle: self.shared.bundle.clone(),
            slots,
        }
    }

    /// Slots currently in `state`
    pub fn count_in(&self, state: SlotState) -> usize {
        self.shared
            .slots()
            .iter()
            .filter(|slot| slot.state == state)
            .count()
    }
}
