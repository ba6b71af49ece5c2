//! Test support utilities shared across unit and integration tests.

use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard as StdMutexGuard};

use serde_json::json;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

use crate::backend::{BackendFuture, BuildService, ObjectStore};
use crate::cloudbuild::Operation;
use crate::storage::ObjectRef;
use crate::template::BuildTemplate;

fn lock<T>(mutex: &Mutex<T>) -> StdMutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|err| panic!("test double lock poisoned: {err}"))
}

/// Error returned by the scripted doubles.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ScriptedError {
    /// Raised by [`RecordingStore`] when configured to fail.
    #[error("scripted upload failure")]
    Upload,
    /// Raised by [`ScriptedBuildService`] when configured to fail.
    #[error("scripted build creation failure")]
    Create,
}

/// Object written through [`RecordingStore`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredObject {
    /// Destination of the write.
    pub object: ObjectRef,
    /// Content type passed by the caller.
    pub content_type: String,
    /// Bytes written.
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct StoreState {
    fail: bool,
    writes: Vec<StoredObject>,
}

/// Object store that keeps every write in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingStore {
    state: Arc<Mutex<StoreState>>,
}

impl RecordingStore {
    /// Creates a store that accepts every write.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail with [`ScriptedError::Upload`].
    pub fn fail_writes(&self) {
        lock(&self.state).fail = true;
    }

    /// Returns a snapshot of the successful writes.
    #[must_use]
    pub fn writes(&self) -> Vec<StoredObject> {
        lock(&self.state).writes.clone()
    }

    /// Number of write attempts that succeeded.
    #[must_use]
    pub fn write_count(&self) -> usize {
        lock(&self.state).writes.len()
    }
}

impl ObjectStore for RecordingStore {
    type Error = ScriptedError;

    fn write<'a>(
        &'a self,
        object: &'a ObjectRef,
        content_type: &'a str,
        data: Vec<u8>,
    ) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            if state.fail {
                return Err(ScriptedError::Upload);
            }
            state.writes.push(StoredObject {
                object: object.clone(),
                content_type: content_type.to_owned(),
                data,
            });
            Ok(())
        })
    }
}

/// Build creation request captured by [`ScriptedBuildService`].
#[derive(Clone, Debug, PartialEq)]
pub struct CreateRequest {
    /// Parent resource passed by the caller.
    pub parent: String,
    /// Build description sent to the service.
    pub build: BuildTemplate,
}

#[derive(Debug, Default)]
struct ServiceState {
    fail: bool,
    metadata_override: Option<Option<serde_json::Value>>,
    requests: Vec<CreateRequest>,
}

/// Build service that records requests and answers with canned operations.
///
/// By default each created build gets the id `build-<n>` (counting from 1)
/// and a matching console log URL.
#[derive(Clone, Debug, Default)]
pub struct ScriptedBuildService {
    state: Arc<Mutex<ServiceState>>,
}

impl ScriptedBuildService {
    /// Creates a service that accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent creations fail with [`ScriptedError::Create`].
    pub fn fail_creates(&self) {
        lock(&self.state).fail = true;
    }

    /// Answers subsequent creations with the given raw metadata.
    pub fn respond_with_metadata(&self, metadata: Option<serde_json::Value>) {
        lock(&self.state).metadata_override = Some(metadata);
    }

    /// Returns a snapshot of the recorded requests.
    #[must_use]
    pub fn requests(&self) -> Vec<CreateRequest> {
        lock(&self.state).requests.clone()
    }

    /// Number of creation requests received, including failed ones.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        lock(&self.state).requests.len()
    }

    /// Log URL reported for `build_id`.
    #[must_use]
    pub fn log_url(build_id: &str) -> String {
        format!("https://console.cloud.google.com/cloud-build/builds/{build_id}")
    }
}

impl BuildService for ScriptedBuildService {
    type Error = ScriptedError;

    fn create_build<'a>(
        &'a self,
        parent: &'a str,
        build: &'a BuildTemplate,
    ) -> BackendFuture<'a, Operation, Self::Error> {
        Box::pin(async move {
            let mut state = lock(&self.state);
            state.requests.push(CreateRequest {
                parent: parent.to_owned(),
                build: build.clone(),
            });
            if state.fail {
                return Err(ScriptedError::Create);
            }

            let build_id = format!("build-{}", state.requests.len());
            let metadata = state.metadata_override.clone().unwrap_or_else(|| {
                Some(json!({
                    "@type": "type.googleapis.com/google.devtools.cloudbuild.v1.BuildOperationMetadata",
                    "build": {
                        "id": build_id,
                        "logUrl": Self::log_url(&build_id),
                        "status": "QUEUED",
                    }
                }))
            });
            Ok(Operation {
                name: format!("operations/build/{parent}/{build_id}"),
                done: false,
                metadata,
            })
        })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
