//! Device and test descriptions consumed by the submitter.
//!
//! A [`Device`] identifies a hardware target and the ordered list of tests
//! that should run against it. The binary reads these from a
//! [`DeviceCatalog`] YAML document; library callers may construct them
//! directly.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::Deserialize;
use thiserror::Error;

/// Vendor and hardware model pair identifying a target.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DeviceType {
    /// Vendor name as free text (for example `Google`).
    pub vendor: String,
    /// Hardware model as free text (for example `Pixel 7`).
    pub hardware_model: String,
}

impl DeviceType {
    /// Creates a device type from its vendor and hardware model.
    #[must_use]
    pub fn new(vendor: impl Into<String>, hardware_model: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            hardware_model: hardware_model.into(),
        }
    }

    /// Returns the platform key used for the `_DUT_PLATFORM` substitution.
    ///
    /// Vendor and model are lower-cased, stripped of space characters, and
    /// joined with an underscore.
    #[must_use]
    pub fn platform_key(&self) -> String {
        format!(
            "{}_{}",
            squash(&self.vendor),
            squash(&self.hardware_model)
        )
    }
}

fn squash(value: &str) -> String {
    value.to_lowercase().replace(' ', "")
}

/// A single test to run on a device.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct TestSpec {
    /// Path of the test entry point within the source tree.
    pub path: String,
    /// Path where the test badge/result is published.
    pub badge_path: String,
}

impl TestSpec {
    /// Creates a test specification.
    #[must_use]
    pub fn new(path: impl Into<String>, badge_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            badge_path: badge_path.into(),
        }
    }
}

/// A target device and the tests scheduled for it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Device {
    /// Vendor and model of the target.
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Tests to run, in submission order.
    #[serde(default)]
    pub tests: Vec<TestSpec>,
}

impl Device {
    /// Creates a device with the given tests.
    #[must_use]
    pub const fn new(device_type: DeviceType, tests: Vec<TestSpec>) -> Self {
        Self { device_type, tests }
    }
}

/// Errors raised while loading a device catalog.
#[derive(Debug, Error)]
pub enum DeviceCatalogError {
    /// Raised when the catalog file cannot be read.
    #[error("failed to read device catalog {path}: {message}")]
    Io {
        /// Catalog path.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the catalog is not valid YAML for the expected shape.
    #[error("failed to parse device catalog {path}: {message}")]
    Parse {
        /// Catalog path.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

/// Collection of devices to fan builds out to.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct DeviceCatalog {
    /// Devices in declaration order.
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl DeviceCatalog {
    /// Parses a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`serde_yaml::Error`] when the document does not match the
    /// catalog shape.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceCatalogError::Io`] when the file cannot be read and
    /// [`DeviceCatalogError::Parse`] when its contents are malformed.
    pub fn load(path: &Utf8Path) -> Result<Self, DeviceCatalogError> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_str().is_empty() => dir,
            _ => Utf8Path::new("."),
        };
        let io_error = |err: std::io::Error| DeviceCatalogError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        let file_name = path.file_name().ok_or_else(|| DeviceCatalogError::Io {
            path: path.to_path_buf(),
            message: String::from("catalog path is missing a file name"),
        })?;

        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
        let contents = dir.read_to_string(file_name).map_err(io_error)?;
        Self::from_yaml(&contents).map_err(|err| DeviceCatalogError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Returns the devices whose platform key matches `platform`, or every
    /// device when no filter is given.
    #[must_use]
    pub fn select(&self, platform: Option<&str>) -> Vec<&Device> {
        self.devices
            .iter()
            .filter(|device| {
                platform.is_none_or(|key| device.device_type.platform_key() == key)
            })
            .collect()
    }
}
