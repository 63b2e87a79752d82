//! Error types of the scanning engine.

use std::io;
use std::path::PathBuf;

/// A mapping listing line that does not have the expected shape.
///
/// The listing comes from the kernel and is assumed well-formed, so this is
/// an internal-consistency fault rather than an ordinary failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed mapping record on line {line}: {text:?}")]
pub struct MapsError {
    /// 1-based line number.
    pub line: usize,
    pub text: String,
}

/// Failures that abort a whole scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The process is gone or we lack the privilege to inspect it.
    #[error("cannot access process {pid} through {}", .path.display())]
    ProcessAccess {
        pid: u32,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Maps(#[from] MapsError),
    /// Result storage could not grow.
    #[error("out of memory growing results past {entries} entries")]
    OutOfMemory { entries: usize },
}

/// Why a single region was skipped. The scan carries on without it.
#[derive(Debug, thiserror::Error)]
pub enum RegionFault {
    /// Usually a mapping that changed after the listing was read.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    #[error("region of {bytes} bytes does not fit in memory")]
    OutOfMemory { bytes: u64 },
}

/// Failures loading or saving a persisted store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot create {}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store I/O failed")]
    Io(#[from] io::Error),
    #[error("store encoding failed")]
    Codec(#[from] bincode::Error),
    #[error("no memory to load a store of {entries} entries")]
    OutOfMemory { entries: u64 },
    #[error("corrupted store: {reason}")]
    Corrupted { reason: &'static str },
}
