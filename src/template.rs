//! Build-job template checked into the source tree.
//!
//! The template is a Cloud Build `Build` resource written as YAML. Only the
//! `substitutions` and `source` fields are interpreted; every other field
//! (steps, timeout, options, ...) is carried through unchanged to the build
//! service.

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::tree::SourceTree;

/// Location of the template relative to the source tree root.
pub const TEMPLATE_PATH: &str = "cloudbuild/virtual.yaml";

/// Errors raised while loading the build template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Raised when the template file is missing or unreadable.
    #[error("failed to read build template {path}: {source}")]
    Load {
        /// Template path within the tree.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Raised when the template is not a valid build description.
    #[error("failed to parse build template {path}: {source}")]
    Parse {
        /// Template path within the tree.
        path: String,
        /// Underlying YAML decode failure.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Cloud Build storage source pointing at an uploaded archive.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSource {
    /// Bucket holding the archive.
    pub bucket: String,
    /// Object path of the archive inside the bucket.
    pub object: String,
}

/// Source section of a build.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Archive stored in Cloud Storage.
    pub storage_source: StorageSource,
}

/// Build description sent to the build service.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTemplate {
    /// User-defined substitutions applied by the build service.
    ///
    /// Unquoted numbers and booleans are accepted and kept as their text.
    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub substitutions: BTreeMap<String, String>,
    /// Source the build runs against; filled in at submission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Remaining build fields, forwarded verbatim.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(D::Error::custom(format!(
                        "substitution {key} must be a scalar"
                    )));
                }
            };
            Ok((key, text))
        })
        .collect()
}

impl BuildTemplate {
    /// Parses a template from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`serde_yaml::Error`] when the document is not a mapping or
    /// a known field has the wrong shape.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Reads and parses [`TEMPLATE_PATH`] from the tree.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Load`] when the file cannot be read and
    /// [`TemplateError::Parse`] when it is malformed.
    pub fn load<T>(tree: &T) -> Result<Self, TemplateError>
    where
        T: SourceTree + ?Sized,
    {
        let bytes = tree
            .read(Utf8Path::new(TEMPLATE_PATH))
            .map_err(|source| TemplateError::Load {
                path: TEMPLATE_PATH.to_owned(),
                source,
            })?;
        serde_yaml::from_slice(&bytes).map_err(|source| TemplateError::Parse {
            path: TEMPLATE_PATH.to_owned(),
            source,
        })
    }

    /// Merges `values` into the substitutions, replacing same-named keys.
    pub fn apply_substitutions(&mut self, values: BTreeMap<String, String>) {
        self.substitutions.extend(values);
    }

    /// Points the build at an archive in Cloud Storage.
    pub fn set_storage_source(&mut self, bucket: impl Into<String>, object: impl Into<String>) {
        self.source = Some(Source {
            storage_source: StorageSource {
                bucket: bucket.into(),
                object: object.into(),
            },
        });
    }
}
