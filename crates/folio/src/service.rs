//! Caller-facing entry points: start a job, poll or stream it, cancel it.
//!
//! Jobs run on their own tokio task. The service keeps one cancellation token
//! per running job and drops it once the run returns.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::broadcast::{JobProgressBroadcaster, JobProgressEvent, JobStatusStore};
use crate::config::{Config, PipelineSettings};
use crate::job::{GenerationJob, GenerationRequest, JobStatus, ProfileData};
use crate::pipeline::{BroadcastProgress, Pipeline, ProgressEvent, ProgressReporter};
use crate::template::ScoredTemplate;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job {job_id} is already {status}")]
    AlreadyFinished { job_id: String, status: JobStatus },
}

/// Handed back when a job is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTicket {
    pub job_id: String,
    pub estimated_time_secs: u64,
    pub status_url: String,
}

type TokenMap = Mutex<HashMap<String, CancellationToken>>;

fn lock(tokens: &TokenMap) -> MutexGuard<'_, HashMap<String, CancellationToken>> {
    match tokens.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Cancellation map lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

#[derive(Clone)]
pub struct GenerationService {
    pipeline: Arc<Pipeline>,
    jobs: Arc<dyn JobStatusStore>,
    broadcaster: JobProgressBroadcaster,
    settings: PipelineSettings,
    cancellations: Arc<TokenMap>,
}

impl GenerationService {
    pub fn new(pipeline: Arc<Pipeline>, settings: PipelineSettings) -> Self {
        Self {
            jobs: pipeline.jobs(),
            broadcaster: JobProgressBroadcaster::new(settings.broadcast_capacity),
            pipeline,
            settings,
            cancellations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let pipeline = Pipeline::from_config(config)?;
        Ok(Self::new(Arc::new(pipeline), config.pipeline.clone()))
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Creates the job and starts it on a spawned task. Returns the pending
    /// snapshot without waiting for any step.
    ///
    /// Must be called from within a tokio runtime.
    pub fn generate(&self, request: GenerationRequest) -> GenerationJob {
        let cancel = CancellationToken::new();
        let ctx = self.pipeline.prepare(request, cancel.clone());
        let snapshot = ctx.job.clone();
        lock(&self.cancellations).insert(snapshot.id.clone(), cancel);

        let reporter = BroadcastProgress::new(self.broadcaster.clone());
        reporter.report(&snapshot, &ProgressEvent::Queued);

        let pipeline = Arc::clone(&self.pipeline);
        let cancellations = Arc::clone(&self.cancellations);
        tokio::spawn(async move {
            let (job, _) = pipeline.run(ctx, &reporter).await;
            lock(&cancellations).remove(&job.id);
            debug!(job_id = %job.id, status = %job.status, "Generation task finished");
        });

        snapshot
    }

    pub fn generate_portfolio(&self, request: GenerationRequest) -> GenerationTicket {
        let job = self.generate(request);
        GenerationTicket {
            status_url: format!(
                "{}/{}",
                self.settings.status_base_url.trim_end_matches('/'),
                job.id
            ),
            job_id: job.id,
            estimated_time_secs: self.settings.estimated_time_secs,
        }
    }

    pub fn get_generation_status(&self, job_id: &str) -> Result<GenerationJob, ServiceError> {
        self.jobs
            .get(job_id)
            .ok_or_else(|| ServiceError::NotFound(job_id.to_string()))
    }

    /// Requests cancellation. The step in flight finishes; the next one is
    /// never entered. Returns the snapshot seen at the time of the request.
    pub fn cancel(&self, job_id: &str) -> Result<GenerationJob, ServiceError> {
        let job = self.get_generation_status(job_id)?;
        if job.is_finished() {
            return Err(ServiceError::AlreadyFinished {
                job_id: job.id,
                status: job.status,
            });
        }

        match lock(&self.cancellations).get(job_id) {
            Some(token) => {
                token.cancel();
                info!(job_id, "Cancellation requested");
                Ok(job)
            }
            // The run returned between the two lookups.
            None => {
                let latest = self.get_generation_status(job_id)?;
                Err(ServiceError::AlreadyFinished {
                    job_id: latest.id,
                    status: latest.status,
                })
            }
        }
    }

    pub fn list_jobs(&self) -> Vec<GenerationJob> {
        self.jobs.list()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.broadcaster.subscribe()
    }

    pub fn recommend_templates(&self, profile: &ProfileData) -> Vec<ScoredTemplate> {
        self.pipeline.recommend(profile, self.settings.recommendations)
    }

    /// Resolves once the job is completed or failed.
    pub async fn wait_for_completion(&self, job_id: &str) -> Result<GenerationJob, ServiceError> {
        // Subscribe before the first read so a terminal event cannot slip
        // between the two.
        let mut rx = self.subscribe();
        let job = self.get_generation_status(job_id)?;
        if job.is_finished() {
            return Ok(job);
        }

        loop {
            match rx.recv().await {
                Ok(event) if event.job_id == job_id && event.is_terminal() => return Ok(event.job),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(job_id, skipped, "Progress subscriber lagged, re-reading store");
                    let job = self.get_generation_status(job_id)?;
                    if job.is_finished() {
                        return Ok(job);
                    }
                }
                Err(RecvError::Closed) => return self.get_generation_status(job_id),
            }
        }
    }
}
