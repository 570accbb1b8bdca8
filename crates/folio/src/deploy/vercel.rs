//! Vercel REST adapter.
//!
//! Files are inlined into the deployment request: text as UTF-8, anything
//! else base64-encoded.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{DeployError, Deployment, DeploymentRequest, DeploymentState, DeploymentTarget, DomainBinding};
use crate::assets::AssetFile;
use crate::config::{DeploymentConfig, HttpConfig};
use crate::sanitize::{redact_url, truncate_body};

pub struct VercelDeploymentTarget {
    client: Client,
    base_url: String,
    token: SecretString,
    team_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDeploymentBody<'a> {
    name: &'a str,
    files: Vec<InlineFile>,
    target: &'a str,
    regions: &'a [String],
    project_settings: ProjectSettings,
}

#[derive(Debug, Serialize)]
struct ProjectSettings {
    framework: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct InlineFile {
    file: String,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentBody {
    id: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    ready_state: Option<DeploymentState>,
    #[serde(default)]
    status: Option<DeploymentState>,
}

impl DeploymentBody {
    /// `readyState`, or the older `status` field when only that is present.
    fn state(&self) -> Result<DeploymentState, DeployError> {
        self.ready_state
            .or(self.status)
            .ok_or_else(|| DeployError::Api {
                status: None,
                message: format!("malformed response: deployment {} has no state", self.id),
            })
    }
}

#[derive(Debug, Serialize)]
struct AddDomainBody<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct DomainBody {
    name: String,
    #[serde(default)]
    verified: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

fn inline_file(file: &AssetFile) -> InlineFile {
    if file.is_text() {
        if let Ok(text) = std::str::from_utf8(&file.bytes) {
            return InlineFile {
                file: file.path.clone(),
                data: text.to_string(),
                encoding: None,
            };
        }
    }
    InlineFile {
        file: file.path.clone(),
        data: BASE64.encode(&file.bytes),
        encoding: Some("base64"),
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error:
                ErrorBody {
                    code: Some(code),
                    message,
                },
        }) => format!("{} ({})", message, code),
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        Err(_) => truncate_body(body),
    }
}

impl VercelDeploymentTarget {
    pub fn new(
        base_url: &str,
        token: SecretString,
        team_id: Option<String>,
        http: &HttpConfig,
    ) -> Result<Self, DeployError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .timeout(Duration::from_secs(http.request_timeout_secs))
            .build()
            .map_err(|e| DeployError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            team_id,
        })
    }

    pub fn from_config(
        config: &DeploymentConfig,
        token: SecretString,
        http: &HttpConfig,
    ) -> Result<Self, DeployError> {
        Self::new(&config.base_url, token, config.team_id.clone(), http)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.bearer_auth(self.token.expose_secret());
        match &self.team_id {
            Some(team) => builder.query(&[("teamId", team)]),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response, DeployError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = status.as_u16(), "Vercel request failed");
        Err(DeployError::Api {
            status: Some(status.as_u16()),
            message,
        })
    }

    async fn parse<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, DeployError> {
        response.json().await.map_err(|e| DeployError::Api {
            status: None,
            message: format!("malformed response: {}", e.without_url()),
        })
    }
}

#[async_trait]
impl DeploymentTarget for VercelDeploymentTarget {
    async fn create_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> Result<Deployment, DeployError> {
        let url = format!("{}/v13/deployments", self.base_url);
        let body = CreateDeploymentBody {
            name: &request.name,
            files: request.files.iter().map(inline_file).collect(),
            target: &request.target,
            regions: &request.regions,
            project_settings: ProjectSettings { framework: None },
        };
        debug!(url = %redact_url(&url), files = body.files.len(), "Creating deployment");

        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let created: DeploymentBody = Self::parse(Self::check(response).await?).await?;

        let state = created.state()?;
        Ok(Deployment {
            id: created.id,
            url: created.url,
            state,
        })
    }

    async fn deployment_state(
        &self,
        deployment_id: &str,
    ) -> Result<DeploymentState, DeployError> {
        let url = format!("{}/v13/deployments/{}", self.base_url, deployment_id);
        let response = self.authorized(self.client.get(&url)).send().await?;
        let deployment: DeploymentBody = Self::parse(Self::check(response).await?).await?;
        deployment.state()
    }

    async fn configure_domain(
        &self,
        project: &str,
        domain: &str,
    ) -> Result<DomainBinding, DeployError> {
        let url = format!("{}/v10/projects/{}/domains", self.base_url, project);
        debug!(url = %redact_url(&url), domain, "Adding project domain");

        let response = self
            .authorized(self.client.post(&url))
            .json(&AddDomainBody { name: domain })
            .send()
            .await?;
        let bound: DomainBody = Self::parse(Self::check(response).await?).await?;

        Ok(DomainBinding {
            domain: bound.name,
            verified: bound.verified,
        })
    }
}
