//! [`SourceTree`] over a directory on disk.

use std::io::{self, Read};
use std::time::UNIX_EPOCH;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Metadata;
use cap_std::fs_utf8::Dir;

use super::{EntryKind, SourceTree, TreeEntry};

/// Source tree rooted at a directory.
///
/// Access goes through a capability handle, so walks and reads cannot leave
/// the root, including through symbolic links.
#[derive(Debug)]
pub struct DirTree {
    root: Dir,
}

impl DirTree {
    /// Opens the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be opened.
    pub fn open(path: &Utf8Path) -> io::Result<Self> {
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { root })
    }

    /// Wraps an already opened directory handle.
    #[must_use]
    pub const fn from_dir(root: Dir) -> Self {
        Self { root }
    }

    fn list(&self, dir: Option<&Utf8Path>) -> io::Result<Vec<String>> {
        let entries = match dir {
            Some(path) => self.root.read_dir(path)?,
            None => self.root.entries()?,
        };
        let mut names = entries
            .map(|entry| entry.and_then(|found| found.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    fn walk_into(&self, dir: Option<&Utf8Path>, out: &mut Vec<TreeEntry>) -> io::Result<()> {
        for name in self.list(dir)? {
            let path = dir.map_or_else(|| Utf8PathBuf::from(&name), |parent| parent.join(&name));
            let metadata = self.root.symlink_metadata(&path)?;
            let file_type = metadata.file_type();

            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_symlink() {
                EntryKind::Symlink {
                    target: self.root.read_link(&path)?,
                }
            } else {
                EntryKind::File
            };
            let size = if matches!(kind, EntryKind::File) {
                metadata.len()
            } else {
                0
            };

            out.push(TreeEntry {
                path: path.clone(),
                mode: permission_bits(&metadata),
                size,
                modified: modified_secs(&metadata),
                kind,
            });

            if file_type.is_dir() {
                self.walk_into(Some(&path), out)?;
            }
        }
        Ok(())
    }
}

impl SourceTree for DirTree {
    fn walk(&self) -> io::Result<Vec<TreeEntry>> {
        let mut out = Vec::new();
        self.walk_into(None, &mut out)?;
        Ok(out)
    }

    fn open(&self, path: &Utf8Path) -> io::Result<Box<dyn Read + '_>> {
        let file = self.root.open(path)?;
        Ok(Box::new(file))
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use cap_std::fs::PermissionsExt;

    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

fn modified_secs(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.into_std().duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| elapsed.as_secs())
}
