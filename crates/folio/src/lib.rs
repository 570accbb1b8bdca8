pub mod assets;
pub mod broadcast;
pub mod config;
pub mod content;
pub mod deploy;
pub mod error;
pub mod job;
pub mod logging;
pub mod performance;
pub mod pipeline;
pub mod sanitize;
pub mod secrets;
pub mod service;
pub mod storage;
pub mod template;

pub use broadcast::{InMemoryJobStore, JobProgressBroadcaster, JobProgressEvent, JobStatusStore};
pub use config::{load_config, load_config_or_default, Config};
pub use error::{ConfigError, FolioError, Result};
pub use job::{
    GenerationJob, GenerationRequest, GenerationResult, JobStatus, ProfileData, StepId,
    StepStatus,
};
pub use pipeline::{Pipeline, PipelineComponents, PipelineConfig, PipelineContext};
pub use secrets::{resolve_secret, SecretError, SecretSource};
pub use service::{GenerationService, GenerationTicket, ServiceError};
pub use template::{Template, TemplateCatalog};
