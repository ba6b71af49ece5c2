//! Cloud Build operation types and the REST client.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

mod client;

pub use client::CloudBuildClient;

/// Long-running operation returned by `projects.locations.builds.create`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Operation {
    /// Server-assigned operation name.
    #[serde(default)]
    pub name: String,
    /// Whether the operation has completed.
    #[serde(default)]
    pub done: bool,
    /// Service-specific metadata; a `BuildOperationMetadata` document for
    /// build creation.
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Metadata attached to a build creation operation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct BuildOperationMetadata {
    /// The build that was created.
    pub build: BuildInfo,
}

/// Subset of the created build that callers report on.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Build identifier.
    pub id: String,
    /// Console URL of the build log.
    pub log_url: String,
    /// Build status at creation time (for example `QUEUED`).
    #[serde(default)]
    pub status: Option<String>,
}

/// Errors raised while interpreting operation metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Raised when the operation carries no metadata.
    #[error("operation {operation} has no metadata")]
    Missing {
        /// Operation name.
        operation: String,
    },
    /// Raised when the metadata is not a build operation document.
    #[error("operation {operation} metadata is not build metadata: {source}")]
    Malformed {
        /// Operation name.
        operation: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
}

impl Operation {
    /// Decodes the operation metadata as [`BuildOperationMetadata`].
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when metadata is absent or malformed.
    pub fn build_metadata(&self) -> Result<BuildOperationMetadata, MetadataError> {
        let metadata = self.metadata.as_ref().ok_or_else(|| MetadataError::Missing {
            operation: self.name.clone(),
        })?;
        BuildOperationMetadata::deserialize(metadata).map_err(|source| MetadataError::Malformed {
            operation: self.name.clone(),
            source,
        })
    }
}

/// Job created by a successful submission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmittedJob {
    /// Build identifier.
    pub job_id: String,
    /// Console URL of the build log.
    pub log_url: String,
}

impl From<BuildOperationMetadata> for SubmittedJob {
    fn from(value: BuildOperationMetadata) -> Self {
        Self {
            job_id: value.build.id,
            log_url: value.build.log_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn operation(metadata: Option<Value>) -> Operation {
        Operation {
            name: String::from("operations/build/proj/abc"),
            done: false,
            metadata,
        }
    }

    #[test]
    fn decodes_build_operation_metadata() {
        let op: Operation = serde_json::from_value(json!({
            "name": "operations/build/proj/abc",
            "metadata": {
                "@type": "type.googleapis.com/google.devtools.cloudbuild.v1.BuildOperationMetadata",
                "build": {
                    "id": "1234-abcd",
                    "status": "QUEUED",
                    "logUrl": "https://console.cloud.google.com/cloud-build/builds/1234-abcd",
                    "steps": []
                }
            }
        }))
        .expect("operation should parse");

        let job = SubmittedJob::from(op.build_metadata().expect("metadata should decode"));
        assert_eq!(job.job_id, "1234-abcd");
        assert_eq!(
            job.log_url,
            "https://console.cloud.google.com/cloud-build/builds/1234-abcd"
        );
    }

    #[test]
    fn missing_metadata_is_an_error() {
        let err = operation(None)
            .build_metadata()
            .expect_err("metadata is required");
        assert!(matches!(err, MetadataError::Missing { .. }), "got {err:?}");
    }

    #[test]
    fn metadata_without_build_is_malformed() {
        let err = operation(Some(json!({ "unexpected": true })))
            .build_metadata()
            .expect_err("build is required");
        let MetadataError::Malformed { ref operation, .. } = err else {
            panic!("expected Malformed, got {err:?}");
        };
        assert_eq!(operation, "operations/build/proj/abc");
    }

    #[test]
    fn build_without_log_url_is_malformed() {
        let err = operation(Some(json!({ "build": { "id": "x" } })))
            .build_metadata()
            .expect_err("logUrl is required");
        assert!(matches!(err, MetadataError::Malformed { .. }), "got {err:?}");
    }
}
