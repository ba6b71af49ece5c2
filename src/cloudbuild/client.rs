//! REST client for the Cloud Build `builds.create` call.

use reqwest::Client;
use tracing::debug;

use crate::api::{ApiError, ensure_success, http_client, join_url};
use crate::backend::{BackendFuture, BuildService};
use crate::config::SubmitterConfig;
use crate::template::BuildTemplate;

use super::Operation;

/// Creates builds through the Cloud Build v1 REST API.
#[derive(Clone, Debug)]
pub struct CloudBuildClient {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl CloudBuildClient {
    /// Creates a client that talks to `endpoint` with a pre-minted OAuth
    /// access token.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    /// Creates a client from the submitter configuration.
    #[must_use]
    pub fn from_config(config: &SubmitterConfig) -> Self {
        Self::new(&config.cloudbuild_endpoint, &config.access_token)
    }

    fn builds_url(&self, parent: &str) -> String {
        join_url(&self.endpoint, &format!("v1/{parent}/builds"))
    }
}

impl BuildService for CloudBuildClient {
    type Error = ApiError;

    fn create_build<'a>(
        &'a self,
        parent: &'a str,
        build: &'a BuildTemplate,
    ) -> BackendFuture<'a, Operation, Self::Error> {
        Box::pin(async move {
            let url = self.builds_url(parent);
            debug!(%parent, "creating build");
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.access_token)
                .json(build)
                .send()
                .await
                .map_err(|err| ApiError::transport(&url, &err))?;
            let body = ensure_success(&url, response)
                .await?
                .text()
                .await
                .map_err(|err| ApiError::transport(&url, &err))?;
            serde_json::from_str(&body).map_err(|err| ApiError::Body {
                url: url.clone(),
                message: err.to_string(),
            })
        })
    }
}
