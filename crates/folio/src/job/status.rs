//! Generation job state machine.
//!
//! A job owns four steps that run in a fixed order. All mutation goes through
//! the transition methods on [`GenerationJob`], which reject anything that
//! would break the ordering or touch a finished job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::result::GenerationResult;

/// Overall status of a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Processing => write!(f, "processing"),
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Error => write!(f, "error"),
        }
    }
}

/// The four phases of a job, in execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    ContentGeneration,
    TemplateSelection,
    StorageUpload,
    Deployment,
}

impl StepId {
    pub const ALL: [StepId; 4] = [
        StepId::ContentGeneration,
        StepId::TemplateSelection,
        StepId::StorageUpload,
        StepId::Deployment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::ContentGeneration => "content-generation",
            StepId::TemplateSelection => "template-selection",
            StepId::StorageUpload => "storage-upload",
            StepId::Deployment => "deployment",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StepId::ContentGeneration => "Generating content",
            StepId::TemplateSelection => "Selecting template and building assets",
            StepId::StorageUpload => "Uploading assets",
            StepId::Deployment => "Deploying site",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            StepId::ContentGeneration => 0,
            StepId::TemplateSelection => 1,
            StepId::StorageUpload => 2,
            StepId::Deployment => 3,
        }
    }

    /// Job progress once this step has started (10, 30, 50, 70).
    pub fn start_checkpoint(&self) -> u8 {
        10 + 20 * self.index() as u8
    }

    /// Job progress once this step has completed (30, 50, 70, 90).
    pub fn completion_checkpoint(&self) -> u8 {
        30 + 20 * self.index() as u8
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub title: String,
    pub status: StepStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Step {
    fn pending(id: StepId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            status: StepStatus::Pending,
            progress: 0,
            started_at: None,
            completed_at: None,
            error: None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Job {0} is already finished")]
    JobFinished(String),

    #[error("Step '{step}' cannot move from {from} to {to}")]
    InvalidStep {
        step: StepId,
        from: StepStatus,
        to: StepStatus,
    },

    #[error("Step '{step}' cannot start before '{blocking}' has completed")]
    OutOfOrder { step: StepId, blocking: StepId },

    #[error("Job cannot complete while step '{0}' is unfinished")]
    Incomplete(StepId),
}

/// One end-to-end generation run and its observable progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub id: String,
    pub status: JobStatus,
    pub progress: u8,
    /// Human-readable label of the current activity.
    pub current_step: String,
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationJob {
    /// Creates a pending job with a fresh random identifier.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            progress: 0,
            current_step: "Queued".to_string(),
            steps: StepId::ALL.iter().map(|id| Step::pending(*id)).collect(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn step(&self, id: StepId) -> &Step {
        &self.steps[id.index()]
    }

    fn step_mut(&mut self, id: StepId) -> &mut Step {
        &mut self.steps[id.index()]
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// The step currently running, if any.
    pub fn processing_step(&self) -> Option<StepId> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Processing)
            .map(|s| s.id)
    }

    pub fn start_step(&mut self, id: StepId) -> Result<(), TransitionError> {
        self.ensure_active()?;
        for earlier in &StepId::ALL[..id.index()] {
            if self.step(*earlier).status != StepStatus::Completed {
                return Err(TransitionError::OutOfOrder {
                    step: id,
                    blocking: *earlier,
                });
            }
        }

        let now = Utc::now();
        let step = self.step_mut(id);
        if step.status != StepStatus::Pending {
            return Err(TransitionError::InvalidStep {
                step: id,
                from: step.status,
                to: StepStatus::Processing,
            });
        }
        step.status = StepStatus::Processing;
        step.started_at = Some(now);

        self.status = JobStatus::Processing;
        self.current_step = id.title().to_string();
        self.advance_progress(id.start_checkpoint());
        self.updated_at = now;
        Ok(())
    }

    pub fn complete_step(&mut self, id: StepId) -> Result<(), TransitionError> {
        self.ensure_active()?;
        let now = Utc::now();
        let step = self.step_mut(id);
        if step.status != StepStatus::Processing {
            return Err(TransitionError::InvalidStep {
                step: id,
                from: step.status,
                to: StepStatus::Completed,
            });
        }
        step.status = StepStatus::Completed;
        step.progress = 100;
        step.completed_at = Some(now);

        self.advance_progress(id.completion_checkpoint());
        self.updated_at = now;
        Ok(())
    }

    /// Marks a running step as errored and fails the whole job.
    pub fn fail_step(&mut self, id: StepId, error: &str) -> Result<(), TransitionError> {
        self.ensure_active()?;
        let now = Utc::now();
        let step = self.step_mut(id);
        if step.status != StepStatus::Processing {
            return Err(TransitionError::InvalidStep {
                step: id,
                from: step.status,
                to: StepStatus::Error,
            });
        }
        step.status = StepStatus::Error;
        step.error = Some(error.to_string());
        step.completed_at = Some(now);

        self.fail(error)
    }

    /// Fails the job without touching any step. Progress keeps its last value.
    pub fn fail(&mut self, error: &str) -> Result<(), TransitionError> {
        self.ensure_active()?;
        self.status = JobStatus::Failed;
        self.error = Some(error.to_string());
        self.current_step = "Failed".to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn complete(&mut self, result: GenerationResult) -> Result<(), TransitionError> {
        self.ensure_active()?;
        if let Some(unfinished) = self
            .steps
            .iter()
            .find(|s| s.status != StepStatus::Completed)
        {
            return Err(TransitionError::Incomplete(unfinished.id));
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.result = Some(result);
        self.current_step = "Completed".to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Updates the activity label without changing state.
    pub fn set_activity(&mut self, label: &str) {
        if !self.is_finished() {
            self.current_step = label.to_string();
            self.updated_at = Utc::now();
        }
    }

    /// Raises progress to `progress`. Never lowers it and never touches a
    /// finished job.
    pub fn advance_progress(&mut self, progress: u8) {
        if self.is_finished() {
            return;
        }
        self.progress = self.progress.max(progress.min(100));
    }

    fn ensure_active(&self) -> Result<(), TransitionError> {
        if self.is_finished() {
            return Err(TransitionError::JobFinished(self.id.clone()));
        }
        Ok(())
    }
}

impl Default for GenerationJob {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::result::{AnalyticsDescriptor, PerformanceMetrics};

    fn result() -> GenerationResult {
        GenerationResult {
            portfolio_id: "p".to_string(),
            url: "https://p.vercel.app".to_string(),
            custom_url: None,
            deployment_id: "dpl".to_string(),
            cdn_provider: "vercel".to_string(),
            performance: PerformanceMetrics {
                page_speed_score: 90,
                load_time_ms: 500,
                bundle_size_bytes: 1000,
            },
            analytics: AnalyticsDescriptor::disabled(),
        }
    }

    fn run_all_steps(job: &mut GenerationJob) {
        for step in StepId::ALL {
            job.start_step(step).unwrap();
            job.complete_step(step).unwrap();
        }
    }

    #[test]
    fn test_new_job_is_pending_with_all_steps_pending() {
        let job = GenerationJob::new();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0);
        assert_eq!(job.steps.len(), 4);
        assert!(job.steps.iter().all(|s| s.status == StepStatus::Pending));
        assert!(job.processing_step().is_none());
    }

    #[test]
    fn test_job_ids_are_unique() {
        assert_ne!(GenerationJob::new().id, GenerationJob::new().id);
    }

    #[test]
    fn test_checkpoints() {
        let starts: Vec<u8> = StepId::ALL.iter().map(|s| s.start_checkpoint()).collect();
        let ends: Vec<u8> = StepId::ALL
            .iter()
            .map(|s| s.completion_checkpoint())
            .collect();
        assert_eq!(starts, vec![10, 30, 50, 70]);
        assert_eq!(ends, vec![30, 50, 70, 90]);
    }

    #[test]
    fn test_start_step_moves_job_to_processing() {
        let mut job = GenerationJob::new();
        job.start_step(StepId::ContentGeneration).unwrap();

        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 10);
        assert_eq!(job.current_step, "Generating content");
        assert_eq!(job.processing_step(), Some(StepId::ContentGeneration));
        assert!(job.step(StepId::ContentGeneration).started_at.is_some());
    }

    #[test]
    fn test_steps_must_run_in_order() {
        let mut job = GenerationJob::new();
        let err = job.start_step(StepId::StorageUpload).unwrap_err();
        assert_eq!(
            err,
            TransitionError::OutOfOrder {
                step: StepId::StorageUpload,
                blocking: StepId::ContentGeneration,
            }
        );
    }

    #[test]
    fn test_completed_step_cannot_restart() {
        let mut job = GenerationJob::new();
        job.start_step(StepId::ContentGeneration).unwrap();
        job.complete_step(StepId::ContentGeneration).unwrap();

        let err = job.start_step(StepId::ContentGeneration).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidStep { .. }));
    }

    #[test]
    fn test_complete_step_requires_processing() {
        let mut job = GenerationJob::new();
        let err = job.complete_step(StepId::ContentGeneration).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidStep {
                step: StepId::ContentGeneration,
                from: StepStatus::Pending,
                to: StepStatus::Completed,
            }
        );
    }

    #[test]
    fn test_fail_step_fails_job_and_pins_progress() {
        let mut job = GenerationJob::new();
        job.start_step(StepId::ContentGeneration).unwrap();
        job.complete_step(StepId::ContentGeneration).unwrap();
        job.start_step(StepId::TemplateSelection).unwrap();
        job.fail_step(StepId::TemplateSelection, "boom").unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("boom"));
        assert_eq!(job.progress, 30);
        assert_eq!(job.step(StepId::TemplateSelection).status, StepStatus::Error);
        assert_eq!(job.step(StepId::StorageUpload).status, StepStatus::Pending);

        job.advance_progress(99);
        assert_eq!(job.progress, 30);
        assert!(matches!(
            job.start_step(StepId::StorageUpload),
            Err(TransitionError::JobFinished(_))
        ));
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut job = GenerationJob::new();
        job.advance_progress(40);
        job.advance_progress(20);
        assert_eq!(job.progress, 40);
        job.advance_progress(250);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_complete_requires_all_steps() {
        let mut job = GenerationJob::new();
        job.start_step(StepId::ContentGeneration).unwrap();
        job.complete_step(StepId::ContentGeneration).unwrap();
        assert_eq!(
            job.complete(result()),
            Err(TransitionError::Incomplete(StepId::TemplateSelection))
        );
    }

    #[test]
    fn test_complete_pins_progress_at_100() {
        let mut job = GenerationJob::new();
        run_all_steps(&mut job);
        assert_eq!(job.progress, 90);

        job.complete(result()).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.result.is_some());
        assert!(job.fail("late").is_err());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_serialized_step_ids_are_kebab_case() {
        let job = GenerationJob::new();
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["steps"][0]["id"], "content-generation");
        assert_eq!(json["steps"][1]["id"], "template-selection");
        assert_eq!(json["status"], "pending");
        assert!(json.get("result").is_none());
    }
}
