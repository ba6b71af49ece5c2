//! Cloud Storage implementation of [`ObjectStore`].

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::api::{ApiError, ensure_success, http_client, join_url};
use crate::backend::{BackendFuture, ObjectStore};
use crate::config::SubmitterConfig;

use super::ObjectRef;

/// Uploads objects through the Cloud Storage JSON API.
#[derive(Clone, Debug)]
pub struct GcsStore {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl GcsStore {
    /// Creates a store that talks to `endpoint` with a pre-minted OAuth
    /// access token.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    /// Creates a store from the submitter configuration.
    #[must_use]
    pub fn from_config(config: &SubmitterConfig) -> Self {
        Self::new(&config.storage_endpoint, &config.access_token)
    }

    fn upload_url(&self, bucket: &str) -> String {
        join_url(
            &self.endpoint,
            &format!("upload/storage/v1/b/{bucket}/o"),
        )
    }
}

impl ObjectStore for GcsStore {
    type Error = ApiError;

    fn write<'a>(
        &'a self,
        object: &'a ObjectRef,
        content_type: &'a str,
        data: Vec<u8>,
    ) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let url = self.upload_url(&object.bucket);
            debug!(%object, bytes = data.len(), "uploading object");
            let response = self
                .client
                .post(&url)
                .query(&[("uploadType", "media"), ("name", object.path.as_str())])
                .bearer_auth(&self.access_token)
                .header(CONTENT_TYPE, content_type)
                .body(data)
                .send()
                .await
                .map_err(|err| ApiError::transport(&url, &err))?;
            ensure_success(&url, response).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_url_targets_media_upload_endpoint() {
        let store = GcsStore::new("https://storage.googleapis.com/", "token");
        assert_eq!(
            store.upload_url("ci-sources"),
            "https://storage.googleapis.com/upload/storage/v1/b/ci-sources/o"
        );
    }
}
