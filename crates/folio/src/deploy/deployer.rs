use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use super::{DeployError, DeploymentRequest, DeploymentState, DeploymentTarget};
use crate::assets::AssetFile;
use crate::config::DeploymentConfig;

#[derive(Debug, Clone)]
pub struct DeployerSettings {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub regions: Vec<String>,
}

impl Default for DeployerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(5_000),
            timeout: Duration::from_millis(300_000),
            regions: vec!["iad1".to_string()],
        }
    }
}

impl From<&DeploymentConfig> for DeployerSettings {
    fn from(config: &DeploymentConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_millis(config.timeout_ms),
            regions: config.regions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutcome {
    pub deployment_id: String,
    /// Host default URL, always with a scheme.
    pub url: String,
    /// Set only when a custom domain was requested and bound.
    pub custom_url: Option<String>,
    pub domain_verified: Option<bool>,
}

/// Creates a deployment, waits for it to become ready and binds the custom
/// domain.
#[derive(Clone)]
pub struct Deployer {
    target: Arc<dyn DeploymentTarget>,
    settings: DeployerSettings,
}

fn with_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

impl Deployer {
    pub fn new(target: Arc<dyn DeploymentTarget>, settings: DeployerSettings) -> Self {
        Self { target, settings }
    }

    pub fn settings(&self) -> &DeployerSettings {
        &self.settings
    }

    pub async fn deploy(
        &self,
        name: &str,
        files: Vec<AssetFile>,
        custom_domain: Option<&str>,
    ) -> Result<DeploymentOutcome, DeployError> {
        let request = DeploymentRequest {
            name: name.to_string(),
            files,
            target: "production".to_string(),
            regions: self.settings.regions.clone(),
        };

        let deployment = self.target.create_deployment(&request).await?;
        info!(deployment_id = %deployment.id, state = %deployment.state, "Deployment created");

        if deployment.state.is_failure() {
            return Err(DeployError::Failed(deployment.state.to_string()));
        }
        if deployment.state != DeploymentState::Ready {
            self.wait_until_ready(&deployment.id).await?;
        }

        let (custom_url, domain_verified) = match custom_domain {
            Some(domain) => {
                let binding = self.target.configure_domain(name, domain).await?;
                info!(domain = %binding.domain, verified = binding.verified, "Custom domain bound");
                (Some(format!("https://{}", binding.domain)), Some(binding.verified))
            }
            None => (None, None),
        };

        Ok(DeploymentOutcome {
            deployment_id: deployment.id,
            url: with_scheme(&deployment.url),
            custom_url,
            domain_verified,
        })
    }

    /// Polls every `poll_interval` until READY. ERROR or CANCELED fail
    /// immediately; running out of `timeout` fails with [`DeployError::Timeout`].
    pub async fn wait_until_ready(&self, deployment_id: &str) -> Result<(), DeployError> {
        let started = Instant::now();
        let mut polls = 0u32;

        while started.elapsed() < self.settings.timeout {
            let state = self.target.deployment_state(deployment_id).await?;
            polls += 1;
            match state {
                DeploymentState::Ready => {
                    debug!(deployment_id, polls, "Deployment ready");
                    return Ok(());
                }
                s if s.is_failure() => return Err(DeployError::Failed(s.to_string())),
                s => debug!(deployment_id, state = %s, polls, "Deployment not ready yet"),
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }

        Err(DeployError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{SimulatedBehavior, SimulatedDeploymentTarget};

    fn settings() -> DeployerSettings {
        DeployerSettings {
            poll_interval: Duration::from_millis(5_000),
            timeout: Duration::from_millis(300_000),
            regions: vec!["iad1".to_string()],
        }
    }

    #[test]
    fn test_with_scheme() {
        assert_eq!(with_scheme("a.vercel.app"), "https://a.vercel.app");
        assert_eq!(with_scheme("http://localhost"), "http://localhost");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_polls() {
        let target = Arc::new(SimulatedDeploymentTarget::new(SimulatedBehavior::ReadyAfter(3)));
        let deployer = Deployer::new(target.clone(), settings());

        let outcome = deployer.deploy("ada-lovelace", vec![], None).await.unwrap();
        assert!(outcome.url.starts_with("https://ada-lovelace-"));
        assert!(outcome.custom_url.is_none());
        assert_eq!(target.polls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_ready_times_out() {
        let target = Arc::new(SimulatedDeploymentTarget::new(SimulatedBehavior::NeverReady));
        let deployer = Deployer::new(target.clone(), settings());

        let started = Instant::now();
        let err = deployer.deploy("ada", vec![], None).await.unwrap_err();
        assert_eq!(err.to_string(), "Deployment timeout");
        assert!(started.elapsed() >= Duration::from_millis(300_000));
        assert_eq!(target.polls(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_state_fails() {
        let target = Arc::new(SimulatedDeploymentTarget::new(SimulatedBehavior::FailAfter(1)));
        let deployer = Deployer::new(target, settings());
        let err = deployer.deploy("ada", vec![], None).await.unwrap_err();
        assert_eq!(err.to_string(), "Deployment failed: ERROR");
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_domain_is_bound() {
        let target = Arc::new(SimulatedDeploymentTarget::new(SimulatedBehavior::ReadyAfter(0)));
        let deployer = Deployer::new(target.clone(), settings());
        let outcome = deployer
            .deploy("ada", vec![], Some("ada.dev"))
            .await
            .unwrap();
        assert_eq!(outcome.custom_url.as_deref(), Some("https://ada.dev"));
        assert_eq!(outcome.domain_verified, Some(true));
        assert_eq!(target.bound_domains(), vec!["ada.dev".to_string()]);
    }
}
