use anyhow::{Context as _, anyhow};
use parsec_domain::ExecutionResult;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Endpoint {
    Execute,
    Validate,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Execute => "execute",
            Endpoint::Validate => "validate",
        }
    }
}

#[derive(serde::Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// Blocking client for the query service's `execute` and `validate` endpoints.
///
/// Engine-level problems (syntax errors, unknown functions) arrive inside a successful
/// [`ExecutionResult`]. Only transport failures, non-2xx statuses and undecodable bodies are
/// errors here.
#[derive(Clone, Debug)]
pub struct QueryClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl QueryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn execute(&self, query: &str) -> anyhow::Result<ExecutionResult> {
        self.post(Endpoint::Execute, query)
    }

    pub fn validate(&self, query: &str) -> anyhow::Result<ExecutionResult> {
        self.post(Endpoint::Validate, query)
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }

    fn post(&self, endpoint: Endpoint, query: &str) -> anyhow::Result<ExecutionResult> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!(url = %url, "posting query");

        let res = self
            .http
            .post(&url)
            .json(&QueryRequest { query })
            .send()
            .with_context(|| format!("{} request failed", endpoint.path()))?;

        let status = res.status();
        let body = res
            .text()
            .with_context(|| format!("failed to read {} response", endpoint.path()))?;
        if !status.is_success() {
            return Err(anyhow!(
                "{} returned {status}: {}",
                endpoint.path(),
                body.trim()
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("failed to decode {} response", endpoint.path()))
    }
}
