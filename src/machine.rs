//! Static mapping from device types to Cloud Build worker machine types.

use std::collections::BTreeMap;

use crate::device::DeviceType;

/// Machine family whose workers need nested virtualisation enabled.
pub const NESTED_VIRTUALIZATION_FAMILY: &str = "n2-standard";

/// Worker argument enabling nested virtualisation.
pub const NESTED_VIRTUALIZATION_ARGS: &str = "--enable-nested-virtualization";

/// Lookup table of virtual device types and the machine type that hosts them.
///
/// Physical devices are absent from the table; the submitter leaves the
/// machine substitutions unset for them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MachineTypeTable {
    entries: BTreeMap<DeviceType, String>,
}

impl MachineTypeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table compiled into the tool.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .with_entry(DeviceType::new("QEMU", "x86_64"), "n2-standard-4")
            .with_entry(DeviceType::new("QEMU", "aarch64"), "n2-standard-8")
            .with_entry(DeviceType::new("QEMU", "riscv64"), "n2-standard-8")
            .with_entry(DeviceType::new("Renode", "cortex-m"), "e2-standard-4")
    }

    /// Adds or replaces an entry.
    #[must_use]
    pub fn with_entry(mut self, device_type: DeviceType, machine_type: impl Into<String>) -> Self {
        self.entries.insert(device_type, machine_type.into());
        self
    }

    /// Returns the machine type for `device_type`, if one is registered.
    #[must_use]
    pub fn lookup(&self, device_type: &DeviceType) -> Option<&str> {
        self.entries.get(device_type).map(String::as_str)
    }

    /// Number of registered device types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether workers of `machine_type` must be started with
/// [`NESTED_VIRTUALIZATION_ARGS`].
#[must_use]
pub fn requires_nested_virtualization(machine_type: &str) -> bool {
    machine_type.contains(NESTED_VIRTUALIZATION_FAMILY)
}
