//! Error types for freespace
//!
//! Two severities exist and never mix:
//! - Per-directory failures ([`DirError`]) are recoverable: the traversal
//!   reports them through the `on_dir_failed` callback and keeps going.
//! - [`ScanError`] values are fatal: the scan stops and the error is
//!   surfaced to the caller. Partially written output is left in place.

use thiserror::Error;

/// A recoverable failure scoped to a single directory.
///
/// Carries the raw OS error code so callers can log or classify it
/// (access denied, path gone, handle exhaustion, ...).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirError {
    /// The directory could not be opened for metadata read.
    #[error("open failed (os error {code})")]
    Open { code: i32 },

    /// A metadata batch query failed for a reason other than exhaustion.
    /// Entries already decoded from earlier batches are kept.
    #[error("metadata query failed (os error {code})")]
    Query { code: i32 },
}

impl DirError {
    /// The underlying OS error code.
    pub fn code(&self) -> i32 {
        match self {
            DirError::Open { code } | DirError::Query { code } => *code,
        }
    }
}

/// Fatal errors that abort a scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// An entry carried a file identifier wider than 64 bits (128-bit
    /// identifiers as used by ReFS). Never truncated, never skipped.
    #[error("unsupported 128-bit file id for '{name}' in {directory}")]
    UnsupportedFileId { directory: String, name: String },

    /// The output sink failed (disk full, permission lost, ...).
    #[error("output pipeline error: {0}")]
    Pipeline(#[from] std::io::Error),

    /// The output writer thread panicked; output state is unknown.
    #[error("output writer thread panicked")]
    WriterPanicked,
}

/// Convenience alias for fatal scan results.
pub type Result<T> = std::result::Result<T, ScanError>;
