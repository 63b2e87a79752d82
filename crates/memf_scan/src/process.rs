//! Attaching to a target process through procfs.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ScanError;
use crate::memory::ProcessMemory;
use crate::region::{parse_maps, Region};

/// A target process: its mapping listing, captured once, and a read
/// handle on its memory.
///
/// The listing is a snapshot. Mappings that change afterwards surface as
/// per-region read faults during the scan.
#[derive(Debug)]
pub struct Process {
    pid: u32,
    regions: Vec<Region>,
    memory: ProcessMemory,
}

impl Process {
    pub fn open(pid: u32) -> Result<Process, ScanError> {
        Process::open_in(Path::new("/proc"), pid)
    }

    /// Like [`Process::open`] against an alternative procfs mount.
    pub fn open_in(procfs: &Path, pid: u32) -> Result<Process, ScanError> {
        let dir = procfs.join(pid.to_string());

        let maps_path = dir.join("maps");
        let listing = fs::read_to_string(&maps_path).map_err(|source| ScanError::ProcessAccess {
            pid,
            path: maps_path,
            source,
        })?;
        let regions = parse_maps(&listing)?;

        let mem_path = dir.join("mem");
        let memory = ProcessMemory::open(&mem_path).map_err(|source| ScanError::ProcessAccess {
            pid,
            path: mem_path,
            source,
        })?;

        debug!(pid, regions = regions.len(), "attached to process");
        Ok(Process {
            pid,
            regions,
            memory,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn memory(&self) -> &ProcessMemory {
        &self.memory
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
