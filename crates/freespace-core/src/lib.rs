//! freespace-core - Filesystem allocation inventory
//!
//! Walks every file and directory under a root path using metadata-only
//! directory queries, never touching file contents, and streams one CSV
//! row per entry (sizes, allocation, 64-bit file id, MIME classification,
//! decomposed path) to a durable sink.
//!
//! # Architecture
//!
//! ```text
//! DirectorySource ──► walk ──► RowEncoder ──► CsvPipeline ──► writer thread ──► file
//!  (packed record     (frontier   (escaping,     (4 MiB buffers,   (FIFO, flush
//!   batches)           stack)      MIME, cache)   2 in flight)      per buffer)
//! ```
//!
//! The traversal and encoding run on the calling thread; file output runs
//! on a dedicated writer thread. The bounded buffer handoff between them
//! is the only synchronization and the only backpressure.
//!
//! Per-directory failures (access denied, races with deletion) are
//! reported and skipped; the scan keeps going. Wide (128-bit) file
//! identifiers and output failures are fatal.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub mod error;
pub mod mime;
pub mod pipeline;
pub mod record;
pub mod row;
pub mod source;
pub mod walk;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{DirError, ScanError};
pub use pipeline::{CsvPipeline, MAX_BUFFERS, MAX_BUFFER_LEN};
pub use record::{RawEntry, RecordCursor, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_REPARSE_POINT};
pub use row::{write_header, RowEncoder, MAX_LEVELS};
pub use source::{DirectoryHandle, DirectorySource, BATCH_BUFFER_LEN};
pub use walk::{walk, WalkStats};

#[cfg(windows)]
pub use source::WindowsSource;

/// Scans the tree under `root` through `source` and streams the CSV
/// report to `output`, creating or truncating it.
///
/// Directories that cannot be opened or fully read are logged, counted in
/// the returned [`WalkStats`], and skipped. Returns an error only for
/// fatal conditions: an unsupported wide file identifier or an output
/// failure (partial output is left in place).
pub fn scan_to_csv<S: DirectorySource>(
    source: &S,
    root: &str,
    output: &Path,
) -> Result<WalkStats, ScanError> {
    let started = Instant::now();
    let mut pipeline = CsvPipeline::create(output)?;
    write_header(pipeline.buf());

    let mut encoder = RowEncoder::new();
    let mut rows: u64 = 0;

    let stats = walk::walk(
        source,
        root,
        |directory: &Arc<str>, name, end_of_file, allocation_size, file_id| {
            encoder.write_row(pipeline.buf(), directory, name, end_of_file, allocation_size, file_id);
            rows += 1;
            if pipeline.flush_if_full()? {
                tracing::info!(rows, elapsed = ?started.elapsed(), "progress");
            }
            Ok(())
        },
        |directory, err| {
            tracing::warn!(directory, code = err.code(), %err, "directory skipped");
        },
    )?;

    pipeline.finish()?;
    tracing::info!(
        rows,
        directories = stats.directories,
        skipped = stats.failed_directories,
        elapsed = ?started.elapsed(),
        "scan complete"
    );
    Ok(stats)
}
