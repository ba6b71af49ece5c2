//! Filesystem views over the source tree being submitted.
//!
//! The submitter only needs two capabilities from a tree: a deterministic
//! walk that yields every entry below the root, and a way to stream a file's
//! bytes. [`DirTree`] provides them over a real directory and
//! [`MemoryTree`] over an in-memory fixture.

use std::io::{self, Read};

use camino::{Utf8Path, Utf8PathBuf};

mod dir;
mod memory;

pub use dir::DirTree;
pub use memory::MemoryTree;

/// Kind of a tree entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryKind {
    /// A directory; archived as a header-only entry.
    Directory,
    /// A regular file; archived with its contents.
    File,
    /// A symbolic link; archived as a link to `target`.
    Symlink {
        /// Link target exactly as stored on disk.
        target: Utf8PathBuf,
    },
}

/// A single entry produced by [`SourceTree::walk`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeEntry {
    /// Path relative to the tree root, `/` separated.
    pub path: Utf8PathBuf,
    /// Entry kind.
    pub kind: EntryKind,
    /// Permission bits.
    pub mode: u32,
    /// Size in bytes; zero for directories and links.
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub modified: u64,
}

impl TreeEntry {
    /// Whether this entry is a directory.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

/// Read-only view over a source tree.
pub trait SourceTree {
    /// Returns every entry below the root in lexical pre-order: entries of a
    /// directory are sorted by name and each directory is followed by its
    /// contents. The root itself is not included.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when any directory cannot be listed or any entry
    /// cannot be inspected.
    fn walk(&self) -> io::Result<Vec<TreeEntry>>;

    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the path does not name a readable file.
    fn open(&self, path: &Utf8Path) -> io::Result<Box<dyn Read + '_>>;

    /// Reads the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be opened or read.
    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        let mut reader = self.open(path)?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
