use anyhow::Context as _;
use clap::Args;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_PROJECT: &str = "<YOUR_PROJECT_ID>";
pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_STAGING_BUCKET: &str = "gs://<YOUR_STAGING_BUCKET_NAME>";
pub const DEFAULT_DISPLAY_NAME: &str = "Google Drive ACL Agent";

#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    /// Google Cloud project that owns the deployment.
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT", default_value = DEFAULT_PROJECT)]
    pub project: String,

    /// Region of the agent engine.
    #[arg(long, env = "GOOGLE_CLOUD_LOCATION", default_value = DEFAULT_LOCATION)]
    pub location: String,

    /// Bucket used to stage the package.
    #[arg(long, env = "STAGING_BUCKET", default_value = DEFAULT_STAGING_BUCKET)]
    pub staging_bucket: String,

    /// Forwarded to the deployed agent unchanged.
    #[arg(long, env = "GOOGLE_GENAI_USE_VERTEXAI", default_value = "True")]
    pub use_vertexai: String,

    /// Newline-delimited dependency list.
    #[arg(long, default_value = "requirements.txt")]
    pub requirements: PathBuf,

    #[arg(long, default_value = DEFAULT_DISPLAY_NAME)]
    pub display_name: String,

    /// Override the deployment API base URL (defaults to the regional endpoint).
    #[arg(long, env = "DRIVE_AGENT_DEPLOY_API_BASE")]
    pub api_base: Option<String>,

    /// Bearer token for the deployment API.
    #[arg(long, env = "GOOGLE_CLOUD_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Print the deployment request instead of submitting it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub project: String,
    pub location: String,
    pub staging_bucket: String,
    pub use_vertexai: String,
    pub requirements: PathBuf,
    pub display_name: String,
    pub api_base: Url,
}

impl DeployArgs {
    pub fn resolve(&self) -> anyhow::Result<DeployConfig> {
        let api_base = match &self.api_base {
            Some(s) => s.clone(),
            None => default_api_base(&self.location),
        };
        let api_base = Url::parse(&api_base).with_context(|| format!("parse api base '{api_base}'"))?;
        Ok(DeployConfig {
            project: self.project.clone(),
            location: self.location.clone(),
            staging_bucket: self.staging_bucket.clone(),
            use_vertexai: self.use_vertexai.clone(),
            requirements: self.requirements.clone(),
            display_name: self.display_name.clone(),
            api_base,
        })
    }
}

#[must_use]
pub fn default_api_base(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com")
}
