use crate::error::{GstatsError, Result};
use serde::de::DeserializeOwned;

pub const API_ROOT: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;

const USER_AGENT: &str = "gstats";

/// Thin wrapper over the GitHub REST and GraphQL APIs. One bearer token,
/// no retries, no rate-limit bookkeeping.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
}

impl GitHubClient {
    /// Create a client from an explicit token or the `GITHUB_TOKEN`
    /// environment variable.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let token = match token {
            Some(t) => t.to_string(),
            None => std::env::var("GITHUB_TOKEN").map_err(|_| {
                GstatsError::Config(
                    "GITHUB_TOKEN not set. Pass --token or set the GITHUB_TOKEN env var".into(),
                )
            })?,
        };

        Ok(Self {
            http: reqwest::Client::new(),
            token,
        })
    }

    /// POST a GraphQL query and return the response body. Payload-level
    /// `errors` are turned into [`GstatsError::Api`].
    pub async fn graphql(&self, query: &str) -> Result<serde_json::Value> {
        let response = self
            .http
            .post(format!("{API_ROOT}/graphql"))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GstatsError::Api(format!(
                "GraphQL request failed with {status}: {body}"
            )));
        }

        let body: serde_json::Value = response.json().await?;
        if let Some(errors) = body.get("errors") {
            return Err(GstatsError::Api(format!("GraphQL errors: {errors}")));
        }
        Ok(body)
    }

    /// GET a REST endpoint and deserialize the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GstatsError::Api(format!(
                "GET {url} failed with {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }
}
