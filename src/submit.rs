//! Orchestrates a single build submission.
//!
//! The workflow loads the build template from the source tree, injects the
//! device substitutions, archives the tree, stages the archive in object
//! storage, and asks the build service to create a job against it. Steps run
//! strictly in order and the first failure ends the submission; nothing is
//! retried or rolled back, so an uploaded archive or a created build may
//! outlive a failed call.

use thiserror::Error;
use tracing::{debug, info};

use crate::archive::{ArchiveError, create_tgz};
use crate::backend::{BuildService, ObjectStore};
use crate::cloudbuild::{MetadataError, SubmittedJob};
use crate::config::BuildTarget;
use crate::device::Device;
use crate::machine::MachineTypeTable;
use crate::storage::{ARCHIVE_CONTENT_TYPE, ObjectRef};
use crate::substitutions::device_substitutions;
use crate::template::{BuildTemplate, TemplateError};
use crate::tree::SourceTree;

/// Errors surfaced while submitting a build.
#[derive(Debug, Error)]
pub enum SubmitError<StoreError, ServiceError>
where
    StoreError: std::error::Error + 'static,
    ServiceError: std::error::Error + 'static,
{
    /// Raised when the build template is missing or malformed.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Raised when the source tree cannot be archived.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    /// Raised when the archive upload fails.
    #[error("failed to upload {object}: {source}")]
    Upload {
        /// Destination of the failed upload.
        object: ObjectRef,
        /// Store specific error.
        #[source]
        source: StoreError,
    },
    /// Raised when the build service rejects the creation request.
    #[error("failed to create build: {0}")]
    Submit(#[source] ServiceError),
    /// Raised when the build service accepted the request but the returned
    /// operation cannot be interpreted. The build may exist.
    #[error("build creation outcome unknown: {0}")]
    ResponseDecode(#[source] MetadataError),
}

impl<StoreError, ServiceError> SubmitError<StoreError, ServiceError>
where
    StoreError: std::error::Error + 'static,
    ServiceError: std::error::Error + 'static,
{
    /// Whether a remote build may have been created despite the error.
    #[must_use]
    pub const fn outcome_unknown(&self) -> bool {
        matches!(self, Self::ResponseDecode(_))
    }
}

/// Packages source trees and submits builds for devices.
///
/// The submitter holds no per-submission state, so one instance may serve
/// concurrent submissions.
#[derive(Debug)]
pub struct BuildSubmitter<S, B> {
    store: S,
    service: B,
    target: BuildTarget,
    machines: MachineTypeTable,
}

impl<S, B> BuildSubmitter<S, B>
where
    S: ObjectStore + Sync,
    B: BuildService + Sync,
{
    /// Creates a submitter that uses the built-in machine type table.
    #[must_use]
    pub fn new(store: S, service: B, target: BuildTarget) -> Self {
        Self {
            store,
            service,
            target,
            machines: MachineTypeTable::builtin(),
        }
    }

    /// Replaces the machine type table.
    #[must_use]
    pub fn with_machine_types(mut self, machines: MachineTypeTable) -> Self {
        self.machines = machines;
        self
    }

    /// Returns the configured build target.
    #[must_use]
    pub const fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// Runs the submission workflow for `device` against `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] for the first step that fails. A
    /// [`SubmitError::ResponseDecode`] means the build may already exist.
    pub async fn submit<T>(
        &self,
        device: &Device,
        tree: &T,
    ) -> Result<SubmittedJob, SubmitError<S::Error, B::Error>>
    where
        T: SourceTree + Sync + ?Sized,
    {
        let platform = device.device_type.platform_key();
        let mut template = BuildTemplate::load(tree)?;
        debug!(%platform, "loaded build template");

        let substitutions = device_substitutions(device, &self.machines);
        template.apply_substitutions(substitutions);
        debug!(%platform, substitutions = ?template.substitutions, "applied substitutions");

        let archive = create_tgz(tree)?;
        debug!(%platform, bytes = archive.len(), "archived source tree");

        let object = ObjectRef::generate(&self.target.bucket);
        self.upload(&object, archive).await?;
        info!(%platform, %object, "uploaded source archive");

        template.set_storage_source(&object.bucket, &object.path);
        let parent = self.target.parent();
        let operation = self
            .service
            .create_build(&parent, &template)
            .await
            .map_err(SubmitError::Submit)?;

        let metadata = operation
            .build_metadata()
            .map_err(SubmitError::ResponseDecode)?;
        let job = SubmittedJob::from(metadata);
        info!(%platform, job_id = %job.job_id, log_url = %job.log_url, "submitted build");
        Ok(job)
    }

    async fn upload(
        &self,
        object: &ObjectRef,
        archive: Vec<u8>,
    ) -> Result<(), SubmitError<S::Error, B::Error>> {
        self.store
            .write(object, ARCHIVE_CONTENT_TYPE, archive)
            .await
            .map_err(|source| SubmitError::Upload {
                object: object.clone(),
                source,
            })
    }
}
