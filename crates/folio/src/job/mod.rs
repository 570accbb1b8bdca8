//! Job domain: the generation request, the tracked job with its steps, and
//! the final result.

pub mod request;
pub mod result;
pub mod status;

pub use request::{
    DeploymentPreferences, Experience, GenerationRequest, ProfileData, Project, Skill,
    ValidationError,
};
pub use result::{AnalyticsDescriptor, GenerationResult, PerformanceMetrics};
pub use status::{GenerationJob, JobStatus, Step, StepId, StepStatus, TransitionError};
