//! Shared fixtures for submission BDD scenarios.

use ci_trigger::test_support::{RecordingStore, ScriptedBuildService};
use ci_trigger::{Device, MemoryTree, SubmittedJob};
use rstest::fixture;

use crate::fixtures::qemu_device;

#[derive(Clone, Debug)]
pub struct SubmitContext {
    pub store: RecordingStore,
    pub service: ScriptedBuildService,
    pub tree: MemoryTree,
    pub device: Device,
    pub outcome: Option<SubmitResult>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitFailureKind {
    Template,
    Archive,
    Upload,
    Submit,
    ResponseDecode,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmitFailure {
    pub kind: SubmitFailureKind,
    pub message: String,
    pub outcome_unknown: bool,
}

#[derive(Clone, Debug)]
pub enum SubmitResult {
    Success(SubmittedJob),
    Failure(SubmitFailure),
}

#[fixture]
pub fn submit_context() -> SubmitContext {
    SubmitContext {
        store: RecordingStore::new(),
        service: ScriptedBuildService::new(),
        tree: MemoryTree::new(),
        device: qemu_device(),
        outcome: None,
    }
}
