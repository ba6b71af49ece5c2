//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default Cloud Build region.
pub const DEFAULT_LOCATION: &str = "us-west1";
/// Default Cloud Storage API endpoint.
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";
/// Default Cloud Build API endpoint.
pub const DEFAULT_CLOUDBUILD_ENDPOINT: &str = "https://cloudbuild.googleapis.com";

/// Submitter settings derived from environment variables and configuration
/// files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "CI_TRIGGER",
    discovery(
        app_name = "ci-trigger",
        env_var = "CI_TRIGGER_CONFIG_PATH",
        config_file_name = "ci-trigger.toml",
        dotfile_name = ".ci-trigger.toml",
        project_file_name = "ci-trigger.toml"
    )
)]
pub struct SubmitterConfig {
    /// Google Cloud project that owns the builds.
    pub project_id: String,
    /// Cloud Build region. Defaults to `us-west1`.
    #[ortho_config(default = DEFAULT_LOCATION.to_owned())]
    pub location: String,
    /// Bucket the build service reads source archives from.
    pub bucket: String,
    /// OAuth access token sent as a bearer token. Minting it is left to the
    /// caller (for example `gcloud auth print-access-token`).
    pub access_token: String,
    /// Cloud Storage API endpoint.
    #[ortho_config(default = DEFAULT_STORAGE_ENDPOINT.to_owned())]
    pub storage_endpoint: String,
    /// Cloud Build API endpoint.
    #[ortho_config(default = DEFAULT_CLOUDBUILD_ENDPOINT.to_owned())]
    pub cloudbuild_endpoint: String,
}

/// Where builds are created and their sources staged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildTarget {
    /// Bucket that receives source archives.
    pub bucket: String,
    /// Google Cloud project identifier.
    pub project_id: String,
    /// Cloud Build region.
    pub location: String,
}

impl BuildTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(
        bucket: impl Into<String>,
        project_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            project_id: project_id.into(),
            location: location.into(),
        }
    }

    /// Returns the `projects/<id>/locations/<region>` parent resource.
    #[must_use]
    pub fn parent(&self) -> String {
        format!(
            "projects/{}/locations/{}",
            self.project_id, self.location
        )
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl SubmitterConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to ci-trigger.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("ci-trigger")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.project_id,
            &FieldMetadata::new("Google Cloud project ID", "CI_TRIGGER_PROJECT_ID", "project_id"),
        )?;
        Self::require_field(
            &self.location,
            &FieldMetadata::new("Cloud Build region", "CI_TRIGGER_LOCATION", "location"),
        )?;
        Self::require_field(
            &self.bucket,
            &FieldMetadata::new("source bucket", "CI_TRIGGER_BUCKET", "bucket"),
        )?;
        Self::require_field(
            &self.access_token,
            &FieldMetadata::new("access token", "CI_TRIGGER_ACCESS_TOKEN", "access_token"),
        )?;
        Self::require_field(
            &self.storage_endpoint,
            &FieldMetadata::new(
                "Cloud Storage endpoint",
                "CI_TRIGGER_STORAGE_ENDPOINT",
                "storage_endpoint",
            ),
        )?;
        Self::require_field(
            &self.cloudbuild_endpoint,
            &FieldMetadata::new(
                "Cloud Build endpoint",
                "CI_TRIGGER_CLOUDBUILD_ENDPOINT",
                "cloudbuild_endpoint",
            ),
        )?;
        Ok(())
    }

    /// Validates the configuration and returns the build target it names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when validation fails.
    pub fn target(&self) -> Result<BuildTarget, ConfigError> {
        self.validate()?;
        Ok(BuildTarget::new(
            self.bucket.trim(),
            self.project_id.trim(),
            self.location.trim(),
        ))
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
