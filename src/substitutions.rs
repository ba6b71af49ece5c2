//! Per-device substitutions injected into the build template.

use std::collections::BTreeMap;

use crate::device::{Device, TestSpec};
use crate::machine::{MachineTypeTable, NESTED_VIRTUALIZATION_ARGS, requires_nested_virtualization};

/// Substitution carrying the device platform key.
pub const DUT_PLATFORM: &str = "_DUT_PLATFORM";
/// Substitution carrying the worker machine type.
pub const MACHINE_TYPE: &str = "_MACHINE_TYPE";
/// Substitution carrying extra worker arguments.
pub const MACHINE_ARGS: &str = "_MACHINE_ARGS";
/// Substitution listing the tests to run.
pub const DUT_TESTS: &str = "_DUT_TESTS";

/// Renders tests as space separated `path,badge_path` pairs.
#[must_use]
pub fn test_list(tests: &[TestSpec]) -> String {
    tests
        .iter()
        .map(|test| format!("{},{}", test.path, test.badge_path))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Computes the substitutions for `device`.
///
/// Machine substitutions are only present when the device type has an entry
/// in `machines`.
#[must_use]
pub fn device_substitutions(
    device: &Device,
    machines: &MachineTypeTable,
) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    values.insert(
        DUT_PLATFORM.to_owned(),
        device.device_type.platform_key(),
    );

    if let Some(machine_type) = machines.lookup(&device.device_type) {
        if requires_nested_virtualization(machine_type) {
            values.insert(
                MACHINE_ARGS.to_owned(),
                NESTED_VIRTUALIZATION_ARGS.to_owned(),
            );
        }
        values.insert(MACHINE_TYPE.to_owned(), machine_type.to_owned());
    }

    values.insert(DUT_TESTS.to_owned(), test_list(&device.tests));
    values
}
