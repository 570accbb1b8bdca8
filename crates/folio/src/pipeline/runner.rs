use std::sync::Arc;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::assets::{build_assets, AssetFile, BuildOptions};
use crate::broadcast::{InMemoryJobStore, JobStatusStore};
use crate::config::{Config, ContentProvider, DeploymentProvider, StorageProvider};
use crate::content::{ContentEnhancer, ContentGenerator, OfflineContentGenerator, OpenAiContentGenerator};
use crate::deploy::{
    Deployer, DeploymentTarget, SimulatedBehavior, SimulatedDeploymentTarget,
    VercelDeploymentTarget,
};
use crate::error::ConfigError;
use crate::job::{
    AnalyticsDescriptor, GenerationJob, GenerationRequest, GenerationResult, ProfileData, StepId,
};
use crate::performance;
use crate::sanitize::slugify;
use crate::secrets::SecretSource;
use crate::storage::{AssetUploader, BucketStore, ObjectStore, StorageError};
use crate::template::{
    recommend_templates, select_optimal_template, ScoredTemplate, Template, TemplateCatalog,
};

use super::config::PipelineConfig;
use super::context::{PipelineContext, TemplateSource};
use super::error::PipelineError;
use super::progress::{NoopProgress, ProgressEvent, ProgressReporter};

/// Vendor adapters and shared state a pipeline runs against.
pub struct PipelineComponents {
    pub generator: Arc<dyn ContentGenerator>,
    pub store: Arc<dyn ObjectStore>,
    pub target: Arc<dyn DeploymentTarget>,
    pub catalog: TemplateCatalog,
    pub jobs: Arc<dyn JobStatusStore>,
}

fn resolve(label: &str, source: &SecretSource) -> Result<SecretString, ConfigError> {
    source.resolve().map_err(|source| ConfigError::Secret {
        label: label.to_string(),
        source,
    })
}

impl PipelineComponents {
    /// Builds the adapters each config section selects. Secrets are resolved
    /// here, so a missing key fails before any job is created.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let generator: Arc<dyn ContentGenerator> = match config.content.provider {
            ContentProvider::Openai => {
                let key = resolve("content.api_key", &config.content.api_key)?;
                Arc::new(OpenAiContentGenerator::from_config(
                    &config.content,
                    key,
                    &config.http,
                )?)
            }
            ContentProvider::Offline => Arc::new(OfflineContentGenerator::new()),
        };

        let store: Arc<dyn ObjectStore> = match config.storage.provider {
            StorageProvider::S3 => {
                let key_id = resolve("storage.access_key_id", &config.storage.access_key_id)?;
                let secret = resolve(
                    "storage.secret_access_key",
                    &config.storage.secret_access_key,
                )?;
                Arc::new(BucketStore::s3(&config.storage, key_id, secret)?)
            }
            StorageProvider::Memory => Arc::new(BucketStore::in_memory(
                &config.storage.public_base_url(),
            )),
        };

        let target: Arc<dyn DeploymentTarget> = match config.deployment.provider {
            DeploymentProvider::Vercel => {
                let token = resolve("deployment.token", &config.deployment.token)?;
                Arc::new(VercelDeploymentTarget::from_config(
                    &config.deployment,
                    token,
                    &config.http,
                )?)
            }
            DeploymentProvider::Simulated => Arc::new(SimulatedDeploymentTarget::new(
                SimulatedBehavior::ReadyAfter(config.deployment.simulated_polls),
            )),
        };

        Ok(Self {
            generator,
            store,
            target,
            catalog: TemplateCatalog::with_overrides(config.templates.clone()),
            jobs: Arc::new(InMemoryJobStore::new()),
        })
    }
}

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    enhancer: ContentEnhancer,
    catalog: TemplateCatalog,
    uploader: AssetUploader,
    deployer: Deployer,
    jobs: Arc<dyn JobStatusStore>,
}

/// `{slug}-{8 hex}`; used both as storage prefix and deployment name.
fn new_portfolio_id(name: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", slugify(name), &suffix[..8])
}

impl Pipeline {
    pub fn new(config: PipelineConfig, components: PipelineComponents) -> Self {
        let enhancer = ContentEnhancer::new(components.generator, config.prompt);
        let deployer = Deployer::new(components.target, config.deployer.clone());
        Self {
            config: Arc::new(config),
            enhancer,
            catalog: components.catalog,
            uploader: AssetUploader::new(components.store),
            deployer,
            jobs: components.jobs,
        }
    }

    /// Production constructor. Builds every adapter from config.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let components = PipelineComponents::from_config(config)?;
        Ok(Self::new(PipelineConfig::from_config(config), components))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn jobs(&self) -> Arc<dyn JobStatusStore> {
        Arc::clone(&self.jobs)
    }

    pub fn recommend(&self, profile: &ProfileData, count: usize) -> Vec<ScoredTemplate> {
        recommend_templates(profile, self.catalog.templates(), count)
    }

    /// Deletes a portfolio's uploaded objects. Never called by [`run`](Self::run).
    pub async fn remove_portfolio(&self, portfolio_id: &str) -> Result<usize, StorageError> {
        self.uploader.remove_portfolio(portfolio_id).await
    }

    /// Creates the job with every step pending and stores it.
    pub fn prepare(&self, request: GenerationRequest, cancel: CancellationToken) -> PipelineContext {
        let job = GenerationJob::new();
        let portfolio_id = new_portfolio_id(&request.profile.name);
        self.jobs.put(&job);
        info!(
            job_id = %job.id,
            portfolio_id = %portfolio_id,
            cdn_provider = %request.preferences.cdn_provider,
            "Generation job created"
        );
        PipelineContext::new(job, request, portfolio_id, cancel)
    }

    /// Prepares and runs a job inline, without progress reporting.
    pub async fn generate(&self, request: GenerationRequest) -> GenerationJob {
        let ctx = self.prepare(request, CancellationToken::new());
        let (job, _) = self.run(ctx, &NoopProgress).await;
        job
    }

    /// Runs the four steps in order. The returned job is always finished:
    /// completed with a result, or failed with the first error.
    pub async fn run(
        &self,
        mut ctx: PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> (GenerationJob, PipelineContext) {
        let span = info_span!("pipeline",
            job_id = %ctx.job.id,
            portfolio_id = %ctx.portfolio_id,
        );
        self.drive(&mut ctx, progress).instrument(span).await;
        (ctx.job.clone(), ctx)
    }

    async fn drive(&self, ctx: &mut PipelineContext, progress: &dyn ProgressReporter) {
        for step in StepId::ALL {
            if ctx.cancel.is_cancelled() {
                info!(next_step = %step, "Cancellation requested, stopping");
                self.fail_job(ctx, None, PipelineError::Cancelled, progress);
                return;
            }

            if let Err(e) = ctx.job.start_step(step) {
                self.fail_job(ctx, None, e.into(), progress);
                return;
            }
            self.publish(&ctx.job, ProgressEvent::StepStarted(step), progress);

            let outcome = self
                .run_step(step, ctx)
                .instrument(info_span!("step", step = %step))
                .await;
            if let Err(e) = outcome {
                self.fail_job(ctx, Some(step), e, progress);
                return;
            }

            // Not published on its own: the next start, or the terminal
            // update, carries the completion so that every processing
            // snapshot has exactly one step running.
            if let Err(e) = ctx.job.complete_step(step) {
                self.fail_job(ctx, None, e.into(), progress);
                return;
            }
        }

        let completed = self
            .build_result(ctx)
            .and_then(|result| ctx.job.complete(result).map_err(PipelineError::from));
        match completed {
            Ok(()) => {
                info!(
                    url = ctx.job.result.as_ref().map(|r| r.url.as_str()).unwrap_or_default(),
                    "Portfolio generated"
                );
                self.publish(&ctx.job, ProgressEvent::Completed, progress);
            }
            Err(e) => self.fail_job(ctx, None, e, progress),
        }
    }

    async fn run_step(&self, step: StepId, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        match step {
            StepId::ContentGeneration => self.step_generate_content(ctx).await,
            StepId::TemplateSelection => self.step_select_template(ctx),
            StepId::StorageUpload => self.step_upload_assets(ctx).await,
            StepId::Deployment => self.step_deploy(ctx).await,
        }
    }

    /// Writes the snapshot to the store, then reports it.
    fn publish(&self, job: &GenerationJob, event: ProgressEvent, progress: &dyn ProgressReporter) {
        self.jobs.put(job);
        progress.report(job, &event);
    }

    fn fail_job(
        &self,
        ctx: &mut PipelineContext,
        step: Option<StepId>,
        error: PipelineError,
        progress: &dyn ProgressReporter,
    ) {
        let message = error.to_string();
        warn!(step = ?step, error = %message, "Generation failed");

        let recorded = match step {
            Some(id) => ctx.job.fail_step(id, &message),
            None => ctx.job.fail(&message),
        };
        if let Err(e) = recorded {
            warn!(error = %e, "Could not record job failure");
            return;
        }
        self.publish(&ctx.job, ProgressEvent::Failed { error: message }, progress);
    }

    async fn step_generate_content(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        ctx.request.validate()?;
        let content = self.enhancer.enhance(&ctx.request.profile).await?;
        debug!(projects = content.projects.len(), "Content generated");
        ctx.content = Some(content);
        Ok(())
    }

    fn step_select_template(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let (template, source) = self.choose_template(&ctx.request);
        info!(template_id = %template.id, source = ?source, "Template selected");

        let content = ctx
            .content
            .as_ref()
            .ok_or(PipelineError::MissingStepOutput(StepId::TemplateSelection))?;
        let options = BuildOptions {
            portfolio_id: ctx.portfolio_id.clone(),
            analytics: AnalyticsDescriptor::for_portfolio(
                &ctx.portfolio_id,
                ctx.request.preferences.analytics,
            ),
        };
        let bundle = build_assets(&ctx.request.profile, content, &template, &options);
        debug!(
            files = bundle.files().count(),
            bytes = bundle.total_size(),
            "Assets built"
        );

        ctx.template = Some(template);
        ctx.template_source = Some(source);
        ctx.bundle = Some(bundle);
        Ok(())
    }

    /// Explicit id if the catalog has it, else the best score, else the
    /// configured default, else the builtin fallback.
    fn choose_template(&self, request: &GenerationRequest) -> (Template, TemplateSource) {
        if let Some(id) = request.template_id.as_deref() {
            match self.catalog.get(id) {
                Some(template) => return (template.clone(), TemplateSource::Explicit),
                None => warn!(template_id = id, "Requested template not in catalog, scoring instead"),
            }
        }

        if let Some(template) = select_optimal_template(&request.profile, self.catalog.templates()) {
            return (template, TemplateSource::Scored);
        }

        let template = self
            .catalog
            .get(&self.config.default_template)
            .cloned()
            .unwrap_or_else(TemplateCatalog::fallback);
        (template, TemplateSource::Default)
    }

    async fn step_upload_assets(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let bundle = ctx
            .bundle
            .as_ref()
            .ok_or(PipelineError::MissingStepOutput(StepId::StorageUpload))?;
        let uploads = self
            .uploader
            .upload(&ctx.portfolio_id, &ctx.job.id, bundle)
            .await?;
        ctx.uploads = Some(uploads);
        Ok(())
    }

    async fn step_deploy(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let files: Vec<AssetFile> = ctx
            .bundle
            .as_ref()
            .ok_or(PipelineError::MissingStepOutput(StepId::Deployment))?
            .files()
            .cloned()
            .collect();
        let outcome = self
            .deployer
            .deploy(
                &ctx.portfolio_id,
                files,
                ctx.request.preferences.custom_domain.as_deref(),
            )
            .await?;
        info!(deployment_id = %outcome.deployment_id, url = %outcome.url, "Deployment ready");
        ctx.deployment = Some(outcome);
        Ok(())
    }

    fn build_result(&self, ctx: &PipelineContext) -> Result<GenerationResult, PipelineError> {
        let missing = || PipelineError::MissingStepOutput(StepId::Deployment);
        let bundle = ctx.bundle.as_ref().ok_or_else(missing)?;
        let template = ctx.template.as_ref().ok_or_else(missing)?;
        let deployment = ctx.deployment.as_ref().ok_or_else(missing)?;

        Ok(GenerationResult {
            portfolio_id: ctx.portfolio_id.clone(),
            url: deployment.url.clone(),
            custom_url: deployment.custom_url.clone(),
            deployment_id: deployment.deployment_id.clone(),
            cdn_provider: ctx.request.preferences.cdn_provider.clone(),
            performance: performance::measure(bundle, template),
            analytics: AnalyticsDescriptor::for_portfolio(
                &ctx.portfolio_id,
                ctx.request.preferences.analytics,
            ),
        })
    }
}
