//! Core library for the `ci-trigger` build submitter.
//!
//! The crate packages a source tree, stages it in Cloud Storage, and asks
//! Cloud Build to run the tree's `cloudbuild/virtual.yaml` pipeline against a
//! particular virtual device. Storage and build creation sit behind the
//! traits in [`backend`] so the workflow in [`submit`] can be exercised with
//! in-memory doubles.

pub mod api;
pub mod archive;
pub mod backend;
pub mod cloudbuild;
pub mod config;
pub mod device;
pub mod machine;
pub mod storage;
pub mod submit;
pub mod substitutions;
pub mod template;
pub mod test_support;
pub mod tree;

pub use api::ApiError;
pub use archive::{ArchiveError, create_tgz};
pub use backend::{BackendFuture, BuildService, ObjectStore};
pub use cloudbuild::{CloudBuildClient, MetadataError, Operation, SubmittedJob};
pub use config::{BuildTarget, ConfigError, SubmitterConfig};
pub use device::{Device, DeviceCatalog, DeviceCatalogError, DeviceType, TestSpec};
pub use machine::MachineTypeTable;
pub use storage::{GcsStore, ObjectRef};
pub use submit::{BuildSubmitter, SubmitError};
pub use template::{BuildTemplate, TemplateError};
pub use tree::{DirTree, MemoryTree, SourceTree, TreeEntry};
