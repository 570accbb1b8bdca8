use tokio_util::sync::CancellationToken;

use crate::assets::AssetBundle;
use crate::content::EnhancedContent;
use crate::deploy::DeploymentOutcome;
use crate::job::{GenerationJob, GenerationRequest};
use crate::storage::UploadedAssets;
use crate::template::Template;

/// How the template for a job was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    /// The request named it and the catalog has it.
    Explicit,
    /// Highest score for the profile.
    Scored,
    /// Neither of the above produced one.
    Default,
}

pub struct PipelineContext {
    // Input
    pub job: GenerationJob,
    pub request: GenerationRequest,
    pub cancel: CancellationToken,
    /// Storage prefix and deployment name, unique per job.
    pub portfolio_id: String,

    // Step 1 result
    pub content: Option<EnhancedContent>,

    // Step 2 results
    pub template: Option<Template>,
    pub template_source: Option<TemplateSource>,
    pub bundle: Option<AssetBundle>,

    // Step 3 result
    pub uploads: Option<UploadedAssets>,

    // Step 4 result
    pub deployment: Option<DeploymentOutcome>,
}

impl PipelineContext {
    pub fn new(
        job: GenerationJob,
        request: GenerationRequest,
        portfolio_id: String,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            job,
            request,
            cancel,
            portfolio_id,
            content: None,
            template: None,
            template_source: None,
            bundle: None,
            uploads: None,
            deployment: None,
        }
    }
}
