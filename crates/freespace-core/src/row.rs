//! CSV row encoding
//!
//! One row per accepted entry: `fileId,endOfFile,allocationSize,
//! extension,mimeType,mimeSubtype`, then the parent directory decomposed
//! into up to [`MAX_LEVELS`] comma-terminated level fields, then the
//! entry name. Fields are quoted only when they contain a comma or a
//! quote, so the common case pays no escaping cost.
//!
//! Paths deeper than [`MAX_LEVELS`] keep their remaining tail unsplit in
//! the last level field, suffixed with one path separator. Such rows have
//! fewer level fields than the header declares; consumers must not assume
//! a fixed column count beyond the first six columns.
//!
//! Entries of one directory arrive consecutively, so the decomposition of
//! the most recent directory is cached and reused while the parent path
//! is the *same instance* (pointer identity, not text equality).

use std::io::Write;
use std::sync::Arc;

use crate::mime;

/// Maximum number of individually emitted path level fields.
pub const MAX_LEVELS: usize = 12;

const SEPARATOR: char = std::path::MAIN_SEPARATOR;

/// Appends the fixed header line.
pub fn write_header(buf: &mut Vec<u8>) {
    buf.extend_from_slice(b"fileId,endOfFile,allocationSize,extension,mimeType,mimeSubtype");
    for level in 0..MAX_LEVELS {
        let _ = write!(buf, ",p{level:02}");
    }
    buf.push(b'\n');
}

/// Encodes rows, memoizing the last directory's decomposition.
#[derive(Default)]
pub struct RowEncoder {
    last_directory: Option<(Arc<str>, Vec<u8>)>,
}

impl RowEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one row for `name` under `directory`.
    pub fn write_row(
        &mut self,
        buf: &mut Vec<u8>,
        directory: &Arc<str>,
        name: &str,
        end_of_file: u64,
        allocation_size: u64,
        file_id: u64,
    ) {
        let extension = extension_of(name);
        let (mime_type, mime_subtype) = match mime::lookup(extension) {
            Some(classification) => match classification.find('/') {
                Some(slash) if slash > 0 => {
                    (&classification[..slash], &classification[slash + 1..])
                }
                _ => (classification, ""),
            },
            None => ("unknown", extension),
        };

        let _ = write!(buf, "{file_id},{end_of_file},{allocation_size},");
        escape_into(buf, extension);
        buf.push(b',');
        escape_into(buf, mime_type);
        buf.push(b',');
        escape_into(buf, mime_subtype);
        buf.push(b',');

        let cached = match &self.last_directory {
            Some((last, text)) if Arc::ptr_eq(last, directory) => {
                buf.extend_from_slice(text);
                true
            }
            _ => false,
        };
        if !cached {
            let from = buf.len();
            write_directory_levels(buf, directory);
            let text = buf[from..].to_vec();
            self.last_directory = Some((Arc::clone(directory), text));
        }

        escape_into(buf, name);
        buf.push(b'\n');
    }
}

/// Extension after the last '.', excluding the dot. Empty when the name
/// has no dot, ends with its last dot, or starts with its only dot.
fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &name[dot + 1..],
    }
}

/// Splits `path` into up to [`MAX_LEVELS`] comma-terminated level fields.
/// Deeper tails are emitted whole, suffixed with one separator.
fn write_directory_levels(buf: &mut Vec<u8>, path: &str) {
    let mut input = path;
    let mut level = 0;

    while !input.is_empty() {
        level += 1;

        if level > MAX_LEVELS {
            escape_into(buf, input);
            let mut sep = [0u8; 4];
            buf.extend_from_slice(SEPARATOR.encode_utf8(&mut sep).as_bytes());
            return;
        }

        match input.find(SEPARATOR) {
            None => {
                escape_into(buf, input);
                buf.push(b',');
                return;
            }
            Some(next) => {
                escape_into(buf, &input[..next]);
                buf.push(b',');
                input = &input[next + SEPARATOR.len_utf8()..];
            }
        }
    }
}

/// Appends `field`, quote-wrapped only when it contains ',' or '"'.
/// Embedded quotes are doubled.
fn escape_into(buf: &mut Vec<u8>, field: &str) {
    let has_comma = field.contains(',');
    let has_quote = field.contains('"');
    if !(has_comma || has_quote) {
        buf.extend_from_slice(field.as_bytes());
        return;
    }

    buf.push(b'"');
    if has_quote {
        for byte in field.bytes() {
            buf.push(byte);
            if byte == b'"' {
                buf.push(b'"');
            }
        }
    } else {
        buf.extend_from_slice(field.as_bytes());
    }
    buf.push(b'"');
}
