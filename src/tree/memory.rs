//! In-memory [`SourceTree`] used for fixtures and generated trees.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};

use camino::{Utf8Path, Utf8PathBuf};

use super::{EntryKind, SourceTree, TreeEntry};

const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIR_MODE: u32 = 0o755;
const LINK_MODE: u32 = 0o777;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Node {
    Dir { mode: u32 },
    File { data: Vec<u8>, mode: u32 },
    Symlink { target: Utf8PathBuf },
}

/// Tree held entirely in memory.
///
/// Parent directories are implied by the paths of their children and do not
/// need to be added explicitly.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryTree {
    nodes: BTreeMap<Utf8PathBuf, Node>,
}

impl MemoryTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a regular file with mode `0644`.
    #[must_use]
    pub fn with_file(self, path: impl AsRef<Utf8Path>, data: impl Into<Vec<u8>>) -> Self {
        self.with_file_mode(path, data, DEFAULT_FILE_MODE)
    }

    /// Adds a regular file with explicit permission bits.
    #[must_use]
    pub fn with_file_mode(
        mut self,
        path: impl AsRef<Utf8Path>,
        data: impl Into<Vec<u8>>,
        mode: u32,
    ) -> Self {
        self.insert(
            path.as_ref(),
            Node::File {
                data: data.into(),
                mode,
            },
        );
        self
    }

    /// Adds an explicit (possibly empty) directory.
    #[must_use]
    pub fn with_dir(mut self, path: impl AsRef<Utf8Path>) -> Self {
        self.insert(
            path.as_ref(),
            Node::Dir {
                mode: DEFAULT_DIR_MODE,
            },
        );
        self
    }

    /// Adds a symbolic link pointing at `target`.
    #[must_use]
    pub fn with_symlink(
        mut self,
        path: impl AsRef<Utf8Path>,
        target: impl Into<Utf8PathBuf>,
    ) -> Self {
        self.insert(
            path.as_ref(),
            Node::Symlink {
                target: target.into(),
            },
        );
        self
    }

    fn insert(&mut self, path: &Utf8Path, node: Node) {
        let normalised = normalise(path);
        for ancestor in normalised.ancestors().skip(1) {
            if ancestor.as_str().is_empty() {
                break;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Dir {
                    mode: DEFAULT_DIR_MODE,
                });
        }
        self.nodes.insert(normalised, node);
    }
}

fn normalise(path: &Utf8Path) -> Utf8PathBuf {
    path.components()
        .filter(|component| matches!(component, camino::Utf8Component::Normal(_)))
        .collect()
}

impl SourceTree for MemoryTree {
    fn walk(&self) -> io::Result<Vec<TreeEntry>> {
        // `Utf8PathBuf` orders component-wise, which is lexical pre-order.
        let entries = self
            .nodes
            .iter()
            .map(|(path, node)| {
                let (kind, mode, size) = match node {
                    Node::Dir { mode } => (EntryKind::Directory, *mode, 0),
                    Node::File { data, mode } => (
                        EntryKind::File,
                        *mode,
                        u64::try_from(data.len()).unwrap_or(u64::MAX),
                    ),
                    Node::Symlink { target } => (
                        EntryKind::Symlink {
                            target: target.clone(),
                        },
                        LINK_MODE,
                        0,
                    ),
                };
                TreeEntry {
                    path: path.clone(),
                    kind,
                    mode,
                    size,
                    modified: 0,
                }
            })
            .collect();
        Ok(entries)
    }

    fn open(&self, path: &Utf8Path) -> io::Result<Box<dyn Read + '_>> {
        match self.nodes.get(&normalise(path)) {
            Some(Node::File { data, .. }) => Ok(Box::new(Cursor::new(data.as_slice()))),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{path} is not a regular file"),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{path} not found"),
            )),
        }
    }
}
