//! Iterative directory traversal
//!
//! Depth-first over an explicit frontier stack, never recursive, so the
//! call depth stays constant no matter how deep the tree nests. Each
//! popped directory is opened through the [`DirectorySource`] and its
//! record batches decoded; accepted entries go to `on_entry`, and any
//! directory that cannot be opened or fully read goes to `on_dir_failed`
//! without stopping the scan.
//!
//! Subdirectories are pushed only when they are not reparse points, so a
//! self-referential junction cannot loop the traversal.

use std::sync::Arc;

use tracing::debug;

use crate::error::{DirError, ScanError};
use crate::record::RecordCursor;
use crate::source::{DirectoryHandle, DirectorySource, BATCH_BUFFER_LEN};

/// Counters accumulated over one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Entries delivered to `on_entry`.
    pub entries: u64,
    /// Directories opened and enumerated (fully or partially).
    pub directories: u64,
    /// Directories reported through `on_dir_failed`.
    pub failed_directories: u64,
}

/// Walks the tree rooted at `root`.
///
/// `on_entry` receives, for every entry that is not "." or "..": the
/// parent directory (shared so callers can key caches on its identity),
/// the entry name, end-of-file size, allocation size, and 64-bit file
/// identifier. Returning `Err` aborts the walk; this is how a failing
/// output pipeline stops a scan.
///
/// `on_dir_failed` receives each directory that could not be opened or
/// fully read, with the failure phase and OS code. These are recoverable:
/// the walk continues with the remaining frontier.
///
/// An entry whose file identifier has any of its upper 64 bits set aborts
/// the whole walk with [`ScanError::UnsupportedFileId`]; it is a policy
/// decision that wide identifiers must never be truncated or skipped.
pub fn walk<S, FE, FD>(
    source: &S,
    root: &str,
    mut on_entry: FE,
    mut on_dir_failed: FD,
) -> Result<WalkStats, ScanError>
where
    S: DirectorySource,
    FE: FnMut(&Arc<str>, &str, u64, u64, u64) -> Result<(), ScanError>,
    FD: FnMut(&str, DirError),
{
    let mut buf = vec![0u8; BATCH_BUFFER_LEN];
    let mut stats = WalkStats::default();
    let mut frontier: Vec<Arc<str>> = vec![Arc::from(root)];

    while let Some(directory) = frontier.pop() {
        let mut handle = match source.open(&directory) {
            Ok(handle) => handle,
            Err(code) => {
                debug!(directory = %directory, code, "directory open failed");
                stats.failed_directories += 1;
                on_dir_failed(&directory, DirError::Open { code });
                continue;
            }
        };
        stats.directories += 1;

        loop {
            match handle.read_batch(&mut buf) {
                Ok(false) => break,
                Ok(true) => {
                    for entry in RecordCursor::new(&buf) {
                        if entry.is_self_or_parent() {
                            continue;
                        }
                        if entry.file_id_high != 0 {
                            return Err(ScanError::UnsupportedFileId {
                                directory: directory.to_string(),
                                name: entry.name_string(),
                            });
                        }

                        let name = entry.name_string();
                        on_entry(
                            &directory,
                            &name,
                            entry.end_of_file,
                            entry.allocation_size,
                            entry.file_id_low,
                        )?;
                        stats.entries += 1;

                        if entry.is_directory() && !entry.is_reparse_point() {
                            frontier.push(join_path(&directory, &name));
                        }
                    }
                }
                Err(code) => {
                    // Entries already decoded from this directory are kept.
                    debug!(directory = %directory, code, "metadata query failed");
                    stats.failed_directories += 1;
                    on_dir_failed(&directory, DirError::Query { code });
                    break;
                }
            }
        }
    }

    Ok(stats)
}

/// Joins a child name onto its parent directory path.
fn join_path(directory: &str, name: &str) -> Arc<str> {
    let mut path = String::with_capacity(directory.len() + 1 + name.len());
    path.push_str(directory);
    if !directory.ends_with(std::path::MAIN_SEPARATOR) {
        path.push(std::path::MAIN_SEPARATOR);
    }
    path.push_str(name);
    Arc::from(path)
}
