//! Staging of source snapshots in object storage.

use std::fmt;

use chrono::Utc;
use uuid::Uuid;

mod gcs;

pub use gcs::GcsStore;

/// Content type recorded on uploaded archives.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/x-tar";

/// Prefix under which archives are stored in the bucket.
pub const OBJECT_PREFIX: &str = "source/";

/// Bucket and object path of an uploaded archive.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ObjectRef {
    /// Bucket name.
    pub bucket: String,
    /// Object path within the bucket.
    pub path: String,
}

impl ObjectRef {
    /// Generates a fresh archive location in `bucket`.
    ///
    /// The path combines the current Unix time in seconds with a random
    /// 128-bit token, so concurrent submissions never collide.
    #[must_use]
    pub fn generate(bucket: impl Into<String>) -> Self {
        Self::at(bucket, Utc::now().timestamp(), Uuid::new_v4())
    }

    /// Builds the archive location for a given timestamp and token.
    #[must_use]
    pub fn at(bucket: impl Into<String>, unix_seconds: i64, token: Uuid) -> Self {
        Self {
            bucket: bucket.into(),
            path: format!("{OBJECT_PREFIX}{unix_seconds}-{}.tgz", token.simple()),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn is_archive_path(path: &str) -> bool {
        let Some(rest) = path
            .strip_prefix(OBJECT_PREFIX)
            .and_then(|tail| tail.strip_suffix(".tgz"))
        else {
            return false;
        };
        let Some((seconds, token)) = rest.split_once('-') else {
            return false;
        };
        !seconds.is_empty()
            && seconds.chars().all(|ch| ch.is_ascii_digit())
            && token.len() == 32
            && token
                .chars()
                .all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch))
    }

    #[test]
    fn generated_paths_match_archive_pattern() {
        let object = ObjectRef::generate("bucket");
        assert_eq!(object.bucket, "bucket");
        assert!(is_archive_path(&object.path), "path: {}", object.path);
    }

    #[test]
    fn paths_embed_timestamp_and_token() {
        let token = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        let object = ObjectRef::at("bucket", 1_700_000_000, token);
        assert_eq!(
            object.path,
            "source/1700000000-0123456789abcdef0123456789abcdef.tgz"
        );
        assert_eq!(
            object.to_string(),
            "gs://bucket/source/1700000000-0123456789abcdef0123456789abcdef.tgz"
        );
    }

    #[test]
    fn paths_are_unique_within_the_same_second() {
        let paths: HashSet<_> = (0..256)
            .map(|_| ObjectRef::at("bucket", 1_700_000_000, Uuid::new_v4()).path)
            .collect();
        assert_eq!(paths.len(), 256);
    }

    #[test]
    fn pattern_rejects_foreign_paths() {
        assert!(!is_archive_path("source/abc-0123.tgz"));
        assert!(!is_archive_path("other/1-0123456789abcdef0123456789abcdef.tgz"));
        assert!(!is_archive_path(
            "source/1-0123456789ABCDEF0123456789ABCDEF.tgz"
        ));
    }
}
