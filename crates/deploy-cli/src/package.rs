//! Request body for creating an agent engine deployment.

use crate::config::DeployConfig;
use drive_agent_tools::agent::AgentDefinition;
use serde::Serialize;

pub const DEPLOY_DESCRIPTION: &str =
    "An agent that can list files in Google Drive, requiring user authorization.";

/// Source artifacts shipped alongside the agent definition.
pub const EXTRA_PACKAGES: &[&str] = &["crates/drive-tools"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentRequest {
    pub display_name: String,
    pub description: String,
    pub spec: DeploymentSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    pub agent: AgentDefinition,
    pub package_spec: PackageSpec,
    pub deployment_spec: EnvSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    pub staging_bucket: String,
    pub requirements: Vec<String>,
    pub extra_packages: Vec<String>,
    pub enable_tracing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvSpec {
    pub env: Vec<EnvVar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// `GOOGLE_CLOUD_PROJECT` and `GOOGLE_CLOUD_LOCATION` are injected by the platform and are not
/// forwarded.
#[must_use]
pub fn build_request(
    cfg: &DeployConfig,
    agent: AgentDefinition,
    requirements: Vec<String>,
) -> CreateDeploymentRequest {
    CreateDeploymentRequest {
        display_name: cfg.display_name.clone(),
        description: DEPLOY_DESCRIPTION.to_string(),
        spec: DeploymentSpec {
            agent,
            package_spec: PackageSpec {
                staging_bucket: cfg.staging_bucket.clone(),
                requirements,
                extra_packages: EXTRA_PACKAGES.iter().map(|s| (*s).to_string()).collect(),
                enable_tracing: true,
            },
            deployment_spec: EnvSpec {
                env: vec![EnvVar {
                    name: "GOOGLE_GENAI_USE_VERTEXAI".to_string(),
                    value: cfg.use_vertexai.clone(),
                }],
            },
        },
    }
}
