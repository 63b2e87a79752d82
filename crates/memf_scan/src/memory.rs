//! Positioned reads from a target address space.

use std::fs::File;
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

/// Anything that can copy bytes out of a target address space.
///
/// The scanner only ever asks for whole regions or single scalars, and
/// a short read is an error.
pub trait MemorySource {
    fn read_exact_at(&self, address: u64, buf: &mut [u8]) -> io::Result<()>;
}

/// The `mem` pseudo-file of a live process, opened read-only.
#[derive(Debug)]
pub struct ProcessMemory {
    file: File,
    path: PathBuf,
}

impl ProcessMemory {
    pub fn open(path: &Path) -> io::Result<ProcessMemory> {
        let file = File::open(path)?;
        Ok(ProcessMemory {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemorySource for ProcessMemory {
    fn read_exact_at(&self, address: u64, buf: &mut [u8]) -> io::Result<()> {
        FileExt::read_exact_at(&self.file, buf, address)
    }
}
