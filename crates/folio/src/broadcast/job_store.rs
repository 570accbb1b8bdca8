//! Job status store.
//!
//! Holds the latest snapshot of every job. The pipeline is the only writer
//! for a given job; readers always get clones.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::job::{GenerationJob, JobStatus};

/// Where job snapshots live. Injected into the pipeline so callers can swap
/// the in-memory map for something durable.
pub trait JobStatusStore: Send + Sync {
    /// Inserts or replaces the snapshot for `job.id`.
    fn put(&self, job: &GenerationJob);

    fn get(&self, job_id: &str) -> Option<GenerationJob>;

    /// All jobs, newest first. Jobs created in the same instant are ordered
    /// by id.
    fn list(&self) -> Vec<GenerationJob>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobCounts {
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.completed + self.failed
    }
}

/// Process-local job store.
///
/// Uses `std::sync::RwLock`; a poisoned lock is recovered rather than
/// propagated since every write replaces a whole snapshot.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, GenerationJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, GenerationJob>> {
        match self.jobs.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, GenerationJob>> {
        match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Returns the count of jobs by status.
    pub fn counts(&self) -> JobCounts {
        let jobs = self.read();
        let mut counts = JobCounts::default();
        for job in jobs.values() {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl JobStatusStore for InMemoryJobStore {
    fn put(&self, job: &GenerationJob) {
        self.write().insert(job.id.clone(), job.clone());
    }

    fn get(&self, job_id: &str) -> Option<GenerationJob> {
        self.read().get(job_id).cloned()
    }

    fn list(&self) -> Vec<GenerationJob> {
        let mut jobs: Vec<GenerationJob> = self.read().values().cloned().collect();
        jobs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        jobs
    }
}
