//! Job status storage and real-time progress streaming.
//!
//! The store holds the latest snapshot of every job; the broadcaster fans
//! each snapshot out to whoever is listening.

pub mod job_progress;
pub mod job_store;

pub use job_progress::{JobProgressBroadcaster, JobProgressEvent};
pub use job_store::{InMemoryJobStore, JobCounts, JobStatusStore};
