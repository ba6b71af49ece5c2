//! BDD step definitions for the submission workflow.

use ci_trigger::test_support::ScriptedError;
use ci_trigger::{BuildSubmitter, Device, DeviceType, MemoryTree, SubmitError};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{SubmitContext, SubmitFailure, SubmitFailureKind, SubmitResult};
use crate::fixtures::{qemu_device, renode_device, source_tree, target};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a source tree with a build template")]
fn tree_with_template(mut submit_context: SubmitContext) -> SubmitContext {
    submit_context.tree = source_tree();
    submit_context
}

#[given("a source tree without a build template")]
fn tree_without_template(mut submit_context: SubmitContext) -> SubmitContext {
    submit_context.tree = MemoryTree::new().with_file("src/main.rs", "fn main() {}\n");
    submit_context
}

#[given("a \"{vendor}\" \"{model}\" device")]
fn device_of_type(mut submit_context: SubmitContext, vendor: String, model: String) -> SubmitContext {
    let device_type = DeviceType::new(vendor, model);
    submit_context.device = [qemu_device(), renode_device()]
        .into_iter()
        .find(|device| device.device_type == device_type)
        .unwrap_or_else(|| Device::new(device_type, Vec::new()));
    submit_context
}

#[given("the object store rejects uploads")]
fn store_rejects_uploads(submit_context: SubmitContext) -> SubmitContext {
    submit_context.store.fail_writes();
    submit_context
}

#[given("the build service rejects builds")]
fn service_rejects_builds(submit_context: SubmitContext) -> SubmitContext {
    submit_context.service.fail_creates();
    submit_context
}

#[given("the build service answers without metadata")]
fn service_answers_without_metadata(submit_context: SubmitContext) -> SubmitContext {
    submit_context.service.respond_with_metadata(None);
    submit_context
}

#[when("I submit the build")]
fn submit_build(submit_context: SubmitContext) -> Result<SubmitContext, StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let SubmitContext {
        store,
        service,
        tree,
        device,
        ..
    } = submit_context;

    let submitter = BuildSubmitter::new(store.clone(), service.clone(), target());
    let result = runtime.block_on(async { submitter.submit(&device, &tree).await });
    let outcome = match result {
        Ok(job) => SubmitResult::Success(job),
        Err(err) => SubmitResult::Failure(SubmitFailure {
            kind: map_failure_kind(&err),
            message: err.to_string(),
            outcome_unknown: err.outcome_unknown(),
        }),
    };

    Ok(SubmitContext {
        store,
        service,
        tree,
        device,
        outcome: Some(outcome),
    })
}

#[then("the submission succeeds")]
fn submission_succeeds(submit_context: &SubmitContext) -> Result<(), StepError> {
    match submit_context.outcome {
        Some(SubmitResult::Success(ref job)) if !job.job_id.is_empty() => Ok(()),
        Some(SubmitResult::Success(_)) => {
            Err(StepError::Assertion(String::from("job id should not be empty")))
        }
        Some(SubmitResult::Failure(ref failure)) => Err(StepError::Assertion(format!(
            "expected success, got failure: {}",
            failure.message
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("the build substitution \"{key}\" is \"{value}\"")]
fn substitution_is(submit_context: &SubmitContext, key: String, value: String) -> Result<(), StepError> {
    let requests = submit_context.service.requests();
    let request = requests
        .first()
        .ok_or_else(|| StepError::Assertion(String::from("missing create request")))?;
    match request.build.substitutions.get(&key) {
        Some(actual) if *actual == value => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected {key}={value}, got {other:?}"
        ))),
    }
}

#[then("the build has no \"{key}\" substitution")]
fn substitution_absent(submit_context: &SubmitContext, key: String) -> Result<(), StepError> {
    let requests = submit_context.service.requests();
    let request = requests
        .first()
        .ok_or_else(|| StepError::Assertion(String::from("missing create request")))?;
    if request.build.substitutions.contains_key(&key) {
        Err(StepError::Assertion(format!("{key} should not be set")))
    } else {
        Ok(())
    }
}

#[then("the archive is uploaded as \"{content_type}\"")]
fn archive_uploaded_as(submit_context: &SubmitContext, content_type: String) -> Result<(), StepError> {
    let writes = submit_context.store.writes();
    let [write] = writes.as_slice() else {
        return Err(StepError::Assertion(format!(
            "expected one upload, got {}",
            writes.len()
        )));
    };
    if write.content_type != content_type {
        return Err(StepError::Assertion(format!(
            "expected content type {content_type}, got {}",
            write.content_type
        )));
    }
    if write.data.starts_with(&[0x1f, 0x8b]) {
        Ok(())
    } else {
        Err(StepError::Assertion(String::from(
            "upload should be gzip compressed",
        )))
    }
}

#[then("the submission error kind is \"{kind}\"")]
fn submission_error_kind(submit_context: &SubmitContext, kind: String) -> Result<(), StepError> {
    let expected = parse_failure_kind(&kind)?;
    let failure = failed(submit_context)?;
    if failure.kind == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected failure kind {expected:?}, got {:?}",
            failure.kind
        )))
    }
}

#[then("nothing is uploaded")]
fn nothing_uploaded(submit_context: &SubmitContext) -> Result<(), StepError> {
    if submit_context.store.write_count() == 0 {
        Ok(())
    } else {
        Err(StepError::Assertion(String::from(
            "archive should not be uploaded",
        )))
    }
}

#[then("no build is created")]
fn no_build_created(submit_context: &SubmitContext) -> Result<(), StepError> {
    if submit_context.service.create_calls() == 0 {
        Ok(())
    } else {
        Err(StepError::Assertion(String::from(
            "build service should not be called",
        )))
    }
}

#[then("the build outcome is known")]
fn outcome_known(submit_context: &SubmitContext) -> Result<(), StepError> {
    if failed(submit_context)?.outcome_unknown {
        Err(StepError::Assertion(String::from(
            "outcome should be known",
        )))
    } else {
        Ok(())
    }
}

#[then("the build outcome is unknown")]
fn outcome_unknown(submit_context: &SubmitContext) -> Result<(), StepError> {
    if failed(submit_context)?.outcome_unknown {
        Ok(())
    } else {
        Err(StepError::Assertion(String::from(
            "outcome should be unknown",
        )))
    }
}

fn failed(submit_context: &SubmitContext) -> Result<&SubmitFailure, StepError> {
    match submit_context.outcome {
        Some(SubmitResult::Failure(ref failure)) => Ok(failure),
        _ => Err(StepError::Assertion(String::from(
            "expected failure outcome",
        ))),
    }
}

const fn map_failure_kind(err: &SubmitError<ScriptedError, ScriptedError>) -> SubmitFailureKind {
    match err {
        SubmitError::Template(_) => SubmitFailureKind::Template,
        SubmitError::Archive(_) => SubmitFailureKind::Archive,
        SubmitError::Upload { .. } => SubmitFailureKind::Upload,
        SubmitError::Submit(_) => SubmitFailureKind::Submit,
        SubmitError::ResponseDecode(_) => SubmitFailureKind::ResponseDecode,
    }
}

fn parse_failure_kind(kind: &str) -> Result<SubmitFailureKind, StepError> {
    match kind {
        "template" => Ok(SubmitFailureKind::Template),
        "archive" => Ok(SubmitFailureKind::Archive),
        "upload" => Ok(SubmitFailureKind::Upload),
        "submit" => Ok(SubmitFailureKind::Submit),
        "response-decode" => Ok(SubmitFailureKind::ResponseDecode),
        other => Err(StepError::Assertion(format!(
            "unknown failure kind {other}"
        ))),
    }
}
