//! In-process deployment target for offline runs and tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use log::warn;

use super::{DeployError, Deployment, DeploymentRequest, DeploymentState, DeploymentTarget, DomainBinding};
use crate::sanitize::slugify;

/// How the simulated host reacts to status polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedBehavior {
    /// BUILDING for this many polls, then READY.
    ReadyAfter(u32),
    /// BUILDING for this many polls, then ERROR.
    FailAfter(u32),
    /// BUILDING forever.
    NeverReady,
}

pub struct SimulatedDeploymentTarget {
    behavior: SimulatedBehavior,
    polls: AtomicU32,
    domains: Mutex<Vec<String>>,
}

impl SimulatedDeploymentTarget {
    pub fn new(behavior: SimulatedBehavior) -> Self {
        Self {
            behavior,
            polls: AtomicU32::new(0),
            domains: Mutex::new(Vec::new()),
        }
    }

    /// Status polls answered so far, across all deployments.
    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn bound_domains(&self) -> Vec<String> {
        self.domains
            .lock()
            .unwrap_or_else(|e| {
                warn!("Simulated domain list lock poisoned, recovering");
                e.into_inner()
            })
            .clone()
    }
}

#[async_trait]
impl DeploymentTarget for SimulatedDeploymentTarget {
    async fn create_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> Result<Deployment, DeployError> {
        let hash: String = uuid::Uuid::new_v4().simple().to_string().chars().take(9).collect();
        Ok(Deployment {
            id: format!("dpl_{}", uuid::Uuid::new_v4().simple()),
            url: format!("{}-{}.vercel.app", slugify(&request.name), hash),
            state: DeploymentState::Queued,
        })
    }

    async fn deployment_state(
        &self,
        _deployment_id: &str,
    ) -> Result<DeploymentState, DeployError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(match self.behavior {
            SimulatedBehavior::ReadyAfter(n) if poll > n => DeploymentState::Ready,
            SimulatedBehavior::FailAfter(n) if poll > n => DeploymentState::Error,
            _ => DeploymentState::Building,
        })
    }

    async fn configure_domain(
        &self,
        _project: &str,
        domain: &str,
    ) -> Result<DomainBinding, DeployError> {
        self.domains
            .lock()
            .unwrap_or_else(|e| {
                warn!("Simulated domain list lock poisoned, recovering");
                e.into_inner()
            })
            .push(domain.to_string());
        Ok(DomainBinding {
            domain: domain.to_string(),
            verified: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn request(name: &str) -> DeploymentRequest {
        DeploymentRequest {
            name: name.to_string(),
            files: vec![],
            target: "production".to_string(),
            regions: vec![],
        }
    }

    #[tokio::test]
    async fn test_url_follows_host_default_pattern() {
        let target = SimulatedDeploymentTarget::new(SimulatedBehavior::ReadyAfter(0));
        let deployment = target.create_deployment(&request("Ada Lovelace")).await.unwrap();
        let re = Regex::new(r"^ada-lovelace-[0-9a-f]{9}\.vercel\.app$").unwrap();
        assert!(re.is_match(&deployment.url), "{}", deployment.url);
        assert!(deployment.id.starts_with("dpl_"));
    }

    #[tokio::test]
    async fn test_deployments_get_distinct_ids() {
        let target = SimulatedDeploymentTarget::new(SimulatedBehavior::ReadyAfter(0));
        let a = target.create_deployment(&request("ada")).await.unwrap();
        let b = target.create_deployment(&request("ada")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.url, b.url);
    }

    #[tokio::test]
    async fn test_fail_after() {
        let target = SimulatedDeploymentTarget::new(SimulatedBehavior::FailAfter(1));
        assert_eq!(
            target.deployment_state("x").await.unwrap(),
            DeploymentState::Building
        );
        assert_eq!(
            target.deployment_state("x").await.unwrap(),
            DeploymentState::Error
        );
    }
}
