//! Directory metadata record decoding
//!
//! The native source fills a caller-supplied buffer with a chain of
//! variable-stride `FILE_ID_EXTD_DIR_INFO` records. Each record carries,
//! at fixed little-endian offsets from its own start:
//!
//! - `[0..4)`   u32  offset to the next record, 0 if this is the last
//! - `[40..48)` u64  end-of-file size
//! - `[48..56)` u64  allocation size
//! - `[56..60)` u32  attribute flags
//! - `[60..64)` u32  name length in bytes
//! - `[72..88)` 16-byte file identifier (lower 8 bytes used; nonzero
//!   upper bytes signal an unsupported wide identifier)
//! - `[88..88+len)` name, UTF-16LE code units
//!
//! Decoding is a pure function over the buffer and is kept apart from the
//! traversal so an alternate metadata source can sit behind the same
//! [`RawEntry`] contract with its own decoder.

use byteorder::{ByteOrder, LittleEndian};

/// Attribute bit: the entry is a directory.
pub const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x0000_0010;

/// Attribute bit: the entry is a reparse point (symlink/junction).
pub const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x0000_0400;

const NEXT_ENTRY_OFFSET: usize = 0;
const END_OF_FILE_OFFSET: usize = 40;
const ALLOCATION_SIZE_OFFSET: usize = 48;
const ATTRIBUTES_OFFSET: usize = 56;
const NAME_LENGTH_OFFSET: usize = 60;
const FILE_ID_OFFSET: usize = 72;
const NAME_OFFSET: usize = 88;

/// One decoded directory entry, borrowing its name from the batch buffer.
#[derive(Debug, Clone, Copy)]
pub struct RawEntry<'a> {
    /// Logical size in bytes.
    pub end_of_file: u64,
    /// Storage actually reserved; may be 0 for sparse files and is not
    /// ordered relative to `end_of_file`.
    pub allocation_size: u64,
    /// Raw attribute flags.
    pub attributes: u32,
    /// Lower 8 bytes of the 16-byte file identifier.
    pub file_id_low: u64,
    /// Upper 8 bytes of the 16-byte file identifier. Must be zero; a
    /// nonzero value means the identifier does not fit 64 bits.
    pub file_id_high: u64,
    /// Name as raw UTF-16LE bytes (even length).
    name: &'a [u8],
}

impl<'a> RawEntry<'a> {
    pub fn is_directory(&self) -> bool {
        self.attributes & FILE_ATTRIBUTE_DIRECTORY != 0
    }

    pub fn is_reparse_point(&self) -> bool {
        self.attributes & FILE_ATTRIBUTE_REPARSE_POINT != 0
    }

    /// True for the "." and ".." entries every directory reports.
    pub fn is_self_or_parent(&self) -> bool {
        matches!(self.name, [b'.', 0] | [b'.', 0, b'.', 0])
    }

    /// Name code units in order.
    pub fn name_units(&self) -> impl Iterator<Item = u16> + 'a {
        self.name
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Name decoded to UTF-8, unpaired surrogates replaced.
    pub fn name_string(&self) -> String {
        char::decode_utf16(self.name_units())
            .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

/// Cursor over one batch buffer, yielding records in chain order.
///
/// Infallible for well-formed buffers; a record whose declared offsets
/// run past the buffer is a contract violation by the source, caught by
/// debug assertions rather than runtime errors.
pub struct RecordCursor<'a> {
    buf: &'a [u8],
}

impl<'a> RecordCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }
}

impl<'a> Iterator for RecordCursor<'a> {
    type Item = RawEntry<'a>;

    fn next(&mut self) -> Option<RawEntry<'a>> {
        if self.buf.is_empty() {
            return None;
        }
        debug_assert!(self.buf.len() >= NAME_OFFSET, "truncated record");

        let next_offset = LittleEndian::read_u32(&self.buf[NEXT_ENTRY_OFFSET..]) as usize;
        let name_len = LittleEndian::read_u32(&self.buf[NAME_LENGTH_OFFSET..]) as usize;
        debug_assert!(self.buf.len() >= NAME_OFFSET + name_len, "name runs past buffer");

        let entry = RawEntry {
            end_of_file: LittleEndian::read_u64(&self.buf[END_OF_FILE_OFFSET..]),
            allocation_size: LittleEndian::read_u64(&self.buf[ALLOCATION_SIZE_OFFSET..]),
            attributes: LittleEndian::read_u32(&self.buf[ATTRIBUTES_OFFSET..]),
            file_id_low: LittleEndian::read_u64(&self.buf[FILE_ID_OFFSET..]),
            file_id_high: LittleEndian::read_u64(&self.buf[FILE_ID_OFFSET + 8..]),
            name: &self.buf[NAME_OFFSET..NAME_OFFSET + name_len],
        };

        self.buf = if next_offset > 0 {
            &self.buf[next_offset..]
        } else {
            &[]
        };

        Some(entry)
    }
}
