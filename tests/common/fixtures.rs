//! Source trees and devices shared by the submission tests.

use ci_trigger::{BuildTarget, Device, DeviceType, MemoryTree, TestSpec};

pub const BUCKET: &str = "hil-ci-sources";
pub const PROJECT_ID: &str = "hil-ci";
pub const LOCATION: &str = "us-west1";

pub const TEMPLATE: &str = concat!(
    "steps:\n",
    "  - name: gcr.io/cloud-builders/docker\n",
    "    args: [\"run\", \"--rm\", \"dut-runner\", \"$_DUT_PLATFORM\"]\n",
    "substitutions:\n",
    "  _DUT_PLATFORM: placeholder\n",
    "  _LOG_LEVEL: debug\n",
    "timeout: 3600s\n",
    "options:\n",
    "  machineType: E2_HIGHCPU_8\n",
);

pub fn source_tree() -> MemoryTree {
    MemoryTree::new()
        .with_file("cloudbuild/virtual.yaml", TEMPLATE)
        .with_file("Cargo.toml", "[package]\nname = \"firmware\"\n")
        .with_file("src/main.rs", "fn main() {}\n")
        .with_file_mode("scripts/flash.sh", "#!/bin/sh\n", 0o755)
}

pub fn qemu_device() -> Device {
    Device::new(
        DeviceType::new("QEMU", "x86_64"),
        vec![
            TestSpec::new("tests/boot", "badges/boot.svg"),
            TestSpec::new("tests/net", "badges/net.svg"),
        ],
    )
}

pub fn renode_device() -> Device {
    Device::new(
        DeviceType::new("Renode", "cortex-m"),
        vec![TestSpec::new("tests/blink", "badges/blink.svg")],
    )
}

pub fn target() -> BuildTarget {
    BuildTarget::new(BUCKET, PROJECT_ID, LOCATION)
}
