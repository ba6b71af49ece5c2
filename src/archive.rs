//! Packs a source tree into an in-memory gzip-compressed tarball.

use std::io::{self, Read};

use camino::Utf8PathBuf;
use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};
use thiserror::Error;

use crate::tree::{EntryKind, SourceTree, TreeEntry};

/// Errors raised while archiving a source tree.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Raised when the tree cannot be walked.
    #[error("failed to walk source tree: {0}")]
    Walk(#[source] io::Error),
    /// Raised when an entry cannot be read or appended.
    #[error("failed to archive {path}: {source}")]
    Entry {
        /// Path of the entry being archived.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Raised when the archive cannot be finalised.
    #[error("failed to finalise archive: {0}")]
    Finish(#[source] io::Error),
}

/// Archives every entry of `tree` (excluding the root) as a `.tgz` buffer.
///
/// Entries appear in walk order. Directories are header-only, files carry
/// their contents, and symbolic links are stored as links.
///
/// # Errors
///
/// Returns [`ArchiveError`] on the first walk, read, or write failure; no
/// partial archive is returned.
pub fn create_tgz<T>(tree: &T) -> Result<Vec<u8>, ArchiveError>
where
    T: SourceTree + ?Sized,
{
    let entries = tree.walk().map_err(ArchiveError::Walk)?;
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    for entry in &entries {
        append_entry(&mut builder, tree, entry).map_err(|source| ArchiveError::Entry {
            path: entry.path.clone(),
            source,
        })?;
    }

    let gzip = builder.into_inner().map_err(ArchiveError::Finish)?;
    gzip.finish().map_err(ArchiveError::Finish)
}

fn append_entry<T>(
    builder: &mut Builder<GzEncoder<Vec<u8>>>,
    tree: &T,
    entry: &TreeEntry,
) -> io::Result<()>
where
    T: SourceTree + ?Sized,
{
    let mut header = Header::new_gnu();
    header.set_mode(entry.mode);
    header.set_mtime(entry.modified);

    match &entry.kind {
        EntryKind::Directory => {
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            builder.append_data(&mut header, &entry.path, io::empty())
        }
        EntryKind::File => {
            header.set_entry_type(EntryType::Regular);
            header.set_size(entry.size);
            let data = read_exact_size(tree, entry)?;
            builder.append_data(&mut header, &entry.path, data.as_slice())
        }
        EntryKind::Symlink { target } => {
            header.set_entry_type(EntryType::Symlink);
            header.set_size(0);
            builder.append_link(&mut header, &entry.path, target)
        }
    }
}

/// Reads a file body, failing when it no longer matches the size recorded
/// by the walk.
fn read_exact_size<T>(tree: &T, entry: &TreeEntry) -> io::Result<Vec<u8>>
where
    T: SourceTree + ?Sized,
{
    let mut data = Vec::new();
    tree.open(&entry.path)?
        .take(entry.size.saturating_add(1))
        .read_to_end(&mut data)?;
    if u64::try_from(data.len()).is_ok_and(|len| len == entry.size) {
        return Ok(data);
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!(
            "{} changed size while archiving: expected {} bytes",
            entry.path, entry.size
        ),
    ))
}
