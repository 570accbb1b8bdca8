//! Publishing built sites to a static host.

pub mod deployer;
pub mod simulated;
pub mod vercel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::AssetFile;

pub use deployer::{Deployer, DeployerSettings, DeploymentOutcome};
pub use simulated::{SimulatedBehavior, SimulatedDeploymentTarget};
pub use vercel::VercelDeploymentTarget;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Vercel API error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("Deployment timeout")]
    Timeout,

    #[error("Deployment failed: {0}")]
    Failed(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientSetup(String),
}

impl From<reqwest::Error> for DeployError {
    fn from(e: reqwest::Error) -> Self {
        DeployError::Api {
            status: e.status().map(|s| s.as_u16()),
            message: e.without_url().to_string(),
        }
    }
}

/// Host-side build state, as reported by the hosting API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentState {
    Queued,
    Initializing,
    Building,
    Ready,
    Error,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Queued => "QUEUED",
            DeploymentState::Initializing => "INITIALIZING",
            DeploymentState::Building => "BUILDING",
            DeploymentState::Ready => "READY",
            DeploymentState::Error => "ERROR",
            DeploymentState::Canceled => "CANCELED",
            DeploymentState::Unknown => "UNKNOWN",
        }
    }

    /// States that will never become READY.
    pub fn is_failure(&self) -> bool {
        matches!(self, DeploymentState::Error | DeploymentState::Canceled)
    }
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    /// Project name; also the host's subdomain stem.
    pub name: String,
    pub files: Vec<AssetFile>,
    /// `production` or `preview`.
    pub target: String,
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub id: String,
    /// Default host URL, possibly without a scheme.
    pub url: String,
    pub state: DeploymentState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainBinding {
    pub domain: String,
    pub verified: bool,
}

#[async_trait]
pub trait DeploymentTarget: Send + Sync {
    async fn create_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> Result<Deployment, DeployError>;

    async fn deployment_state(&self, deployment_id: &str)
        -> Result<DeploymentState, DeployError>;

    async fn configure_domain(
        &self,
        project: &str,
        domain: &str,
    ) -> Result<DomainBinding, DeployError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parsing() {
        let state: DeploymentState = serde_json::from_str("\"READY\"").unwrap();
        assert_eq!(state, DeploymentState::Ready);
        let state: DeploymentState = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(state, DeploymentState::Unknown);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(DeployError::Timeout.to_string(), "Deployment timeout");
        assert_eq!(
            DeployError::Failed("ERROR".to_string()).to_string(),
            "Deployment failed: ERROR"
        );
    }
}
