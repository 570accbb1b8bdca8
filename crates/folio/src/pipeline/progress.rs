use crate::broadcast::job_progress::{JobProgressBroadcaster, JobProgressEvent};
use crate::job::{GenerationJob, StepId};

/// Events emitted by the pipeline. Each one is reported together with the
/// job snapshot taken right after the change it describes. A step's
/// completion shows up in the snapshot of the next event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Queued,
    StepStarted(StepId),
    Completed,
    Failed { error: String },
}

impl ProgressEvent {
    pub fn step(&self) -> Option<StepId> {
        match self {
            ProgressEvent::StepStarted(id) => Some(*id),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ProgressEvent::Queued => "Job queued".to_string(),
            ProgressEvent::StepStarted(id) => format!("{}...", id.title()),
            ProgressEvent::Completed => "Portfolio generated successfully".to_string(),
            ProgressEvent::Failed { error } => format!("Generation failed: {}", error),
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, job: &GenerationJob, event: &ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _job: &GenerationJob, _event: &ProgressEvent) {}
}

/// Bridges pipeline events to the broadcast channel.
pub struct BroadcastProgress {
    broadcaster: JobProgressBroadcaster,
}

impl BroadcastProgress {
    pub fn new(broadcaster: JobProgressBroadcaster) -> Self {
        Self { broadcaster }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, job: &GenerationJob, event: &ProgressEvent) {
        self.broadcaster
            .send(JobProgressEvent::new(job, event.step(), &event.message()));
    }
}
