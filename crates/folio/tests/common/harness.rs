//! Test harness for isolated pipeline runs.
//!
//! The `TestHarness` wires a [`Pipeline`] to in-process vendors:
//! - a scripted or offline content generator
//! - an in-memory bucket
//! - the simulated deployment target
//!
//! Every run records the snapshots handed to the progress reporter.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use folio::broadcast::{InMemoryJobStore, JobStatusStore};
use folio::config::PipelineSettings;
use folio::content::{ContentError, ContentGenerator, OfflineContentGenerator, Prompt, PromptKind};
use folio::deploy::{DeployerSettings, SimulatedBehavior, SimulatedDeploymentTarget};
use folio::job::{GenerationJob, GenerationRequest};
use folio::pipeline::{
    Pipeline, PipelineComponents, PipelineConfig, PipelineContext, ProgressEvent, ProgressReporter,
};
use folio::storage::BucketStore;
use folio::template::TemplateCatalog;
use folio::GenerationService;

pub const PUBLIC_BASE_URL: &str = "https://cdn.folio.test";

/// Records every reported snapshot. Optionally cancels a token when a given
/// event is reported.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<(ProgressEvent, GenerationJob)>>,
    cancel_on: Option<(ProgressEvent, CancellationToken)>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_on(event: ProgressEvent, token: CancellationToken) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            cancel_on: Some((event, token)),
        }
    }

    pub fn events(&self) -> Vec<(ProgressEvent, GenerationJob)> {
        self.events.lock().unwrap().clone()
    }

    pub fn snapshots(&self) -> Vec<GenerationJob> {
        self.events().into_iter().map(|(_, job)| job).collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, job: &GenerationJob, event: &ProgressEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.clone(), job.clone()));
        if let Some((trigger, token)) = &self.cancel_on {
            if trigger == event {
                token.cancel();
            }
        }
    }
}

/// Content generator with canned answers. Counts calls.
pub struct ScriptedGenerator {
    failure: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with an API error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(ContentError::Api {
                status: Some(500),
                message: message.clone(),
            });
        }
        Ok(match prompt.kind {
            PromptKind::Bio => "Builds reliable systems.".to_string(),
            PromptKind::SeoMetadata => {
                r#"{"title": "Scripted", "description": "Scripted profile", "keywords": ["scripted"]}"#
                    .to_string()
            }
            PromptKind::ColorPalette => r##"{"primary": "#111111", "secondary": "#222222", "accent": "#333333", "background": "#ffffff", "text": "#000000"}"##.to_string(),
            PromptKind::CallToAction => {
                r#"{"headline": "Hire me", "buttonLabel": "Contact"}"#.to_string()
            }
            PromptKind::ProjectDescription(index) => format!("Project number {}.", index),
        })
    }
}

/// Offline answers, but every call waits until [`GatedGenerator::open`].
pub struct GatedGenerator {
    gate: Semaphore,
    inner: OfflineContentGenerator,
}

impl GatedGenerator {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            inner: OfflineContentGenerator::new(),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[async_trait]
impl ContentGenerator for GatedGenerator {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ContentError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| ContentError::Generation(e.to_string()))?;
        self.inner.complete(prompt).await
    }
}

pub struct HarnessBuilder {
    generator: Arc<dyn ContentGenerator>,
    catalog: TemplateCatalog,
    behavior: SimulatedBehavior,
    deployer: DeployerSettings,
}

impl HarnessBuilder {
    pub fn generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn deploy_behavior(mut self, behavior: SimulatedBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.deployer.poll_interval = interval;
        self.deployer.timeout = timeout;
        self
    }

    pub fn build(self) -> TestHarness {
        let jobs = Arc::new(InMemoryJobStore::new());
        let store = Arc::new(BucketStore::in_memory(PUBLIC_BASE_URL));
        let target = Arc::new(SimulatedDeploymentTarget::new(self.behavior));

        let config = PipelineConfig {
            deployer: self.deployer,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(
            config,
            PipelineComponents {
                generator: self.generator,
                store: store.clone(),
                target: target.clone(),
                catalog: self.catalog,
                jobs: jobs.clone(),
            },
        );

        TestHarness {
            pipeline,
            jobs,
            store,
            target,
        }
    }
}

/// What a single harness run produced.
pub struct RunOutcome {
    pub job: GenerationJob,
    pub ctx: PipelineContext,
    pub events: Vec<(ProgressEvent, GenerationJob)>,
}

impl RunOutcome {
    pub fn snapshots(&self) -> Vec<GenerationJob> {
        self.events.iter().map(|(_, job)| job.clone()).collect()
    }
}

pub struct TestHarness {
    pub pipeline: Pipeline,
    pub jobs: Arc<InMemoryJobStore>,
    pub store: Arc<BucketStore>,
    pub target: Arc<SimulatedDeploymentTarget>,
}

impl TestHarness {
    /// Offline content, builtin catalog, deployment ready on the first poll.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            generator: Arc::new(OfflineContentGenerator::new()),
            catalog: TemplateCatalog::builtin(),
            behavior: SimulatedBehavior::ReadyAfter(0),
            deployer: DeployerSettings::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub async fn run(&self, request: GenerationRequest) -> RunOutcome {
        let cancel = CancellationToken::new();
        let progress = RecordingProgress::new();
        self.run_with(request, cancel, progress).await
    }

    /// Runs with a token that is cancelled as soon as `event` is reported.
    pub async fn run_cancelling_on(
        &self,
        request: GenerationRequest,
        event: ProgressEvent,
    ) -> RunOutcome {
        let cancel = CancellationToken::new();
        let progress = RecordingProgress::cancelling_on(event, cancel.clone());
        self.run_with(request, cancel, progress).await
    }

    async fn run_with(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
        progress: RecordingProgress,
    ) -> RunOutcome {
        let ctx = self.pipeline.prepare(request, cancel);
        let (job, ctx) = self.pipeline.run(ctx, &progress).await;
        RunOutcome {
            job,
            ctx,
            events: progress.events(),
        }
    }

    pub fn stored(&self, job_id: &str) -> Option<GenerationJob> {
        self.jobs.get(job_id)
    }

    /// Hands the pipeline to a service with the given settings.
    pub fn into_service(self, settings: PipelineSettings) -> GenerationService {
        GenerationService::new(Arc::new(self.pipeline), settings)
    }
}
