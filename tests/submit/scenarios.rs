//! BDD scenarios for the submission workflow.

use rstest_bdd_macros::scenario;

use super::test_helpers::{SubmitContext, submit_context};

#[scenario(
    path = "tests/features/submit.feature",
    name = "Submit a build for a QEMU device"
)]
fn scenario_submit_qemu(submit_context: SubmitContext) {
    drop(submit_context);
}

#[scenario(
    path = "tests/features/submit.feature",
    name = "Submit a build for a Renode device"
)]
fn scenario_submit_renode(submit_context: SubmitContext) {
    drop(submit_context);
}

#[scenario(
    path = "tests/features/submit.feature",
    name = "Reject a source tree without a build template"
)]
fn scenario_missing_template(submit_context: SubmitContext) {
    drop(submit_context);
}

#[scenario(
    path = "tests/features/submit.feature",
    name = "Stop after an upload failure"
)]
fn scenario_upload_failure(submit_context: SubmitContext) {
    drop(submit_context);
}

#[scenario(
    path = "tests/features/submit.feature",
    name = "Surface build creation failures"
)]
fn scenario_create_failure(submit_context: SubmitContext) {
    drop(submit_context);
}

#[scenario(
    path = "tests/features/submit.feature",
    name = "Flag an undecodable build response"
)]
fn scenario_undecodable_response(submit_context: SubmitContext) {
    drop(submit_context);
}
