use crate::package::CreateDeploymentRequest;
use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

/// Long-running operation returned by the create call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

impl Operation {
    /// Name of the deployed resource, without the `/operations/<id>` suffix.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        resource_name_from_operation(&self.name)
    }
}

#[must_use]
pub fn resource_name_from_operation(name: &str) -> &str {
    name.split_once("/operations/").map_or(name, |(resource, _)| resource)
}

/// Trailing path segment of a resource name.
#[must_use]
pub fn deployment_id(resource_name: &str) -> Option<&str> {
    resource_name
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct ApiClient {
    api_base: Url,
    token: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(api_base: Url, token: String) -> Self {
        Self {
            api_base,
            token,
            http: reqwest::Client::new(),
        }
    }

    /// `path` is appended to the base, so a base path prefix is kept.
    fn url(&self, path: &str) -> anyhow::Result<Url> {
        let raw = format!("{}{path}", self.api_base.as_str().trim_end_matches('/'));
        Url::parse(&raw).with_context(|| format!("append path '{path}' to api_base"))
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.token)
    }

    pub async fn create_reasoning_engine(
        &self,
        project: &str,
        location: &str,
        request: &CreateDeploymentRequest,
    ) -> anyhow::Result<Operation> {
        let url = self.url(&format!(
            "/v1/projects/{project}/locations/{location}/reasoningEngines"
        ))?;
        let resp = self
            .auth(self.http.post(url))
            .json(request)
            .send()
            .await
            .context("POST reasoningEngines")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("POST reasoningEngines status {status}: {body}");
        }

        let op: Operation = resp
            .json()
            .await
            .context("parse create reasoning engine response")?;
        Ok(op)
    }
}
