//! Test support: packed-record fixtures and an in-memory directory source.
//!
//! Builds batch buffers in the exact layout the native source returns, so
//! the decoder and traversal are exercised against real byte chains.

use std::cell::RefCell;
use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};

use crate::record::{FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_REPARSE_POINT};
use crate::source::{DirectoryHandle, DirectorySource};

const NAME_OFFSET: usize = 88;

/// Description of one packed record.
#[derive(Debug, Clone)]
pub(crate) struct RecordSpec {
    pub name: String,
    pub end_of_file: u64,
    pub allocation_size: u64,
    pub attributes: u32,
    pub file_id_low: u64,
    pub file_id_high: u64,
}

impl RecordSpec {
    pub fn file(name: &str, end_of_file: u64, allocation_size: u64, file_id: u64) -> Self {
        Self {
            name: name.to_string(),
            end_of_file,
            allocation_size,
            attributes: 0,
            file_id_low: file_id,
            file_id_high: 0,
        }
    }

    pub fn dir(name: &str, file_id: u64) -> Self {
        Self {
            name: name.to_string(),
            end_of_file: 0,
            allocation_size: 0,
            attributes: FILE_ATTRIBUTE_DIRECTORY,
            file_id_low: file_id,
            file_id_high: 0,
        }
    }

    pub fn reparse(mut self) -> Self {
        self.attributes |= FILE_ATTRIBUTE_REPARSE_POINT;
        self
    }

    pub fn id_high(mut self, high: u64) -> Self {
        self.file_id_high = high;
        self
    }
}

/// Packs records into one batch buffer, strides 8-aligned, last record's
/// next-entry offset zero.
pub(crate) fn pack_batch(specs: &[RecordSpec]) -> Vec<u8> {
    let mut batch = Vec::new();
    for (index, spec) in specs.iter().enumerate() {
        let name_bytes: Vec<u8> = spec
            .name
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        let len = NAME_OFFSET + name_bytes.len();
        let stride = (len + 7) & !7;
        let last = index + 1 == specs.len();

        let mut record = vec![0u8; if last { len } else { stride }];
        LittleEndian::write_u32(&mut record[0..], if last { 0 } else { stride as u32 });
        LittleEndian::write_u64(&mut record[40..], spec.end_of_file);
        LittleEndian::write_u64(&mut record[48..], spec.allocation_size);
        LittleEndian::write_u32(&mut record[56..], spec.attributes);
        LittleEndian::write_u32(&mut record[60..], name_bytes.len() as u32);
        LittleEndian::write_u64(&mut record[72..], spec.file_id_low);
        LittleEndian::write_u64(&mut record[80..], spec.file_id_high);
        record[NAME_OFFSET..NAME_OFFSET + name_bytes.len()].copy_from_slice(&name_bytes);
        batch.extend_from_slice(&record);
    }
    batch
}

enum DirSpec {
    Batches(Vec<Vec<u8>>),
    OpenFail(i32),
    QueryFail { batches: Vec<Vec<u8>>, code: i32 },
}

/// In-memory [`DirectorySource`] serving pre-packed batches per path.
pub(crate) struct FakeSource {
    dirs: HashMap<String, DirSpec>,
    opened: RefCell<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            dirs: HashMap::new(),
            opened: RefCell::new(Vec::new()),
        }
    }

    /// Registers a directory served as a single batch.
    pub fn dir(mut self, path: &str, entries: &[RecordSpec]) -> Self {
        let batches = if entries.is_empty() {
            Vec::new()
        } else {
            vec![pack_batch(entries)]
        };
        self.dirs.insert(path.to_string(), DirSpec::Batches(batches));
        self
    }

    /// Registers a directory served as several batches.
    pub fn dir_batches(mut self, path: &str, batches: &[&[RecordSpec]]) -> Self {
        let packed = batches.iter().map(|b| pack_batch(b)).collect();
        self.dirs.insert(path.to_string(), DirSpec::Batches(packed));
        self
    }

    /// Registers a directory whose open fails with `code`.
    pub fn open_fails(mut self, path: &str, code: i32) -> Self {
        self.dirs.insert(path.to_string(), DirSpec::OpenFail(code));
        self
    }

    /// Registers a directory whose query fails with `code` after serving
    /// `entries` as one batch.
    pub fn query_fails_after(mut self, path: &str, entries: &[RecordSpec], code: i32) -> Self {
        let batches = if entries.is_empty() {
            Vec::new()
        } else {
            vec![pack_batch(entries)]
        };
        self.dirs
            .insert(path.to_string(), DirSpec::QueryFail { batches, code });
        self
    }

    /// Paths opened so far, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

pub(crate) struct FakeHandle {
    batches: Vec<Vec<u8>>,
    next: usize,
    fail_code: Option<i32>,
}

impl DirectorySource for FakeSource {
    type Handle = FakeHandle;

    fn open(&self, path: &str) -> Result<FakeHandle, i32> {
        self.opened.borrow_mut().push(path.to_string());
        match self.dirs.get(path) {
            Some(DirSpec::Batches(batches)) => Ok(FakeHandle {
                batches: batches.clone(),
                next: 0,
                fail_code: None,
            }),
            Some(DirSpec::QueryFail { batches, code }) => Ok(FakeHandle {
                batches: batches.clone(),
                next: 0,
                fail_code: Some(*code),
            }),
            Some(DirSpec::OpenFail(code)) => Err(*code),
            // Path not registered: report "not found".
            None => Err(2),
        }
    }
}

impl DirectoryHandle for FakeHandle {
    fn read_batch(&mut self, buf: &mut [u8]) -> Result<bool, i32> {
        if self.next < self.batches.len() {
            let batch = &self.batches[self.next];
            assert!(batch.len() <= buf.len(), "fixture batch exceeds query buffer");
            buf[..batch.len()].copy_from_slice(batch);
            self.next += 1;
            Ok(true)
        } else if let Some(code) = self.fail_code.take() {
            Err(code)
        } else {
            Ok(false)
        }
    }
}
