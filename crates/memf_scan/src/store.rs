//! Persisted scan results.
//!
//! # Layout
//!
//! Little-endian, fixed-width, no padding:
//!
//! ```text
//! kind tag   u32      (1 = i8 .. 6 = f64)
//! count      u64      (never 0)
//! count × {
//!     address  u64
//!     value    u64    sign-extended integer, or f64 bits
//! }
//! ```
//!
//! `f32` values are stored widened to `f64`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::Options;
use memf_ir::{Scalar, ScalarKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ScanError, StoreError};

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

#[derive(Serialize, Deserialize)]
struct Header {
    kind: u32,
    count: u64,
}

#[derive(Serialize, Deserialize)]
struct Record {
    address: u64,
    value: u64,
}

/// One matched address and the value it held when last tested.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StoreEntry {
    pub address: u64,
    pub value: Scalar,
}

/// The result of a scan: entries of a single scalar kind, in address order
/// of discovery.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreSet {
    kind: ScalarKind,
    entries: Vec<StoreEntry>,
}

/// A store read back from disk.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedStore {
    pub store: StoreSet,
    /// The file ended before `count` records; `store` holds the complete
    /// records that were present.
    pub truncated: bool,
}

impl StoreSet {
    pub fn new(kind: ScalarKind) -> Self {
        StoreSet {
            kind,
            entries: Vec::new(),
        }
    }

    /// Every entry must hold a value of `kind`.
    pub fn from_entries(kind: ScalarKind, entries: Vec<StoreEntry>) -> Self {
        debug_assert!(entries.iter().all(|entry| entry.value.kind() == kind));
        StoreSet { kind, entries }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn entries(&self) -> &[StoreEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<StoreEntry> {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoreEntry> {
        self.entries.iter()
    }

    /// Append a match, reporting allocation failure instead of aborting.
    pub fn try_push(&mut self, entry: StoreEntry) -> Result<(), ScanError> {
        self.entries
            .try_reserve(1)
            .map_err(|_| ScanError::OutOfMemory {
                entries: self.entries.len(),
            })?;
        self.entries.push(entry);
        Ok(())
    }

    // ─── Persistence ───

    /// Load the store at `path`. `Ok(None)` when there is no such file.
    pub fn load(path: &Path) -> Result<Option<LoadedStore>, StoreError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Open {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let loaded = StoreSet::read_from(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            kind = %loaded.store.kind,
            entries = loaded.store.len(),
            truncated = loaded.truncated,
            "loaded store"
        );
        Ok(Some(loaded))
    }

    /// Write the store to `path`, replacing any previous contents.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let file = File::create(path).map_err(|source| StoreError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!(path = %path.display(), entries = self.len(), "saved store");
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<LoadedStore, StoreError> {
        let header: Header = codec().deserialize_from(&mut reader).map_err(|err| {
            if is_eof(&err) {
                StoreError::Corrupted {
                    reason: "missing header",
                }
            } else {
                StoreError::Codec(err)
            }
        })?;
        let kind = ScalarKind::from_tag(header.kind).ok_or(StoreError::Corrupted {
            reason: "unknown scalar kind tag",
        })?;
        if header.count == 0 {
            return Err(StoreError::Corrupted {
                reason: "zero entries declared",
            });
        }

        // Room for every declared record, or a clean failure.
        let out_of_memory = || StoreError::OutOfMemory {
            entries: header.count,
        };
        let expected = usize::try_from(header.count).map_err(|_| out_of_memory())?;
        let mut entries: Vec<StoreEntry> = Vec::new();
        entries
            .try_reserve_exact(expected)
            .map_err(|_| out_of_memory())?;
        let mut truncated = false;
        for _ in 0..header.count {
            let record: Record = match codec().deserialize_from(&mut reader) {
                Ok(record) => record,
                Err(err) if is_eof(&err) => {
                    truncated = true;
                    break;
                }
                Err(err) => return Err(StoreError::Codec(err)),
            };
            entries.push(StoreEntry {
                address: record.address,
                value: Scalar::from_bits(kind, record.value),
            });
        }
        if truncated {
            warn!(
                declared = header.count,
                loaded = entries.len(),
                "store is truncated, continuing with the complete records"
            );
        }
        Ok(LoadedStore {
            store: StoreSet { kind, entries },
            truncated,
        })
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), StoreError> {
        let header = Header {
            kind: self.kind.tag(),
            count: self.entries.len() as u64,
        };
        codec().serialize_into(&mut writer, &header)?;
        for entry in &self.entries {
            let record = Record {
                address: entry.address,
                value: entry.value.to_bits(),
            };
            codec().serialize_into(&mut writer, &record)?;
        }
        Ok(())
    }
}

fn is_eof(err: &bincode::Error) -> bool {
    matches!(&**err, bincode::ErrorKind::Io(io) if io.kind() == io::ErrorKind::UnexpectedEof)
}

impl<'a> IntoIterator for &'a StoreSet {
    type Item = &'a StoreEntry;
    type IntoIter = std::slice::Iter<'a, StoreEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
