//! Backend abstractions for the external platform clients.
//!
//! The submitter talks to two services: an object store that stages the
//! source archive and a build service that creates the job. Both are traits
//! so the workflow can run against recording doubles in tests.

use std::future::Future;
use std::pin::Pin;

use crate::cloudbuild::Operation;
use crate::storage::ObjectRef;
use crate::template::BuildTemplate;

/// Future returned by backend operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Blob store used to stage source snapshots.
pub trait ObjectStore {
    /// Provider specific error type returned by the store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Writes `data` to `object` with the given content type.
    ///
    /// The write either completes fully or fails; no cleanup is attempted
    /// for partially written objects.
    fn write<'a>(
        &'a self,
        object: &'a ObjectRef,
        content_type: &'a str,
        data: Vec<u8>,
    ) -> BackendFuture<'a, (), Self::Error>;
}

/// Managed build service that accepts job creation requests.
pub trait BuildService {
    /// Provider specific error type returned by the service.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a build under `parent` (`projects/<id>/locations/<region>`)
    /// and returns the long-running operation describing it.
    fn create_build<'a>(
        &'a self,
        parent: &'a str,
        build: &'a BuildTemplate,
    ) -> BackendFuture<'a, Operation, Self::Error>;
}
