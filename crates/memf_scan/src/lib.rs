//! Memf Scan - the memory scanning engine.
//!
//! # Pipeline
//!
//! ```text
//! maps listing → Region → RegionFilter → region bytes → probes → StoreSet
//! ```
//!
//! 1. [`parse_maps`] turns the target's mapping listing into [`Region`]s.
//! 2. [`RegionFilter`] keeps regions whose permissions match a
//!    [`PermissionMask`] and whose interval overlaps an [`AddressRange`].
//!    Overlapping regions are scanned whole, never clipped.
//! 3. [`scan_regions`] reads each region in one go through a
//!    [`MemorySource`] and tests a probe at every step (the scalar size, or
//!    1 byte when alignment is off) against a [`Predicate`].
//! 4. Matches land in a [`StoreSet`], which persists between invocations.
//!    [`narrow_store`] re-tests only the stored addresses.
//!
//! A region that cannot be read is skipped and recorded in the
//! [`ScanReport`]; only process access, malformed listings and exhausted
//! memory abort a scan.

mod compare;
mod error;
mod filter;
mod memory;
mod process;
mod region;
mod scanner;
mod store;

pub use compare::{CompareOp, Comparison};
pub use error::{MapsError, RegionFault, ScanError, StoreError};
pub use filter::{AddressRange, FilterError, PermissionMask, RegionFilter};
pub use memory::{MemorySource, ProcessMemory};
pub use process::Process;
pub use region::{parse_maps, Permissions, Region};
pub use scanner::{
    narrow_store, scan_regions, Baseline, ExpressionPredicate, Predicate, ScanPlan, ScanReport,
    SkippedRegion,
};
pub use store::{LoadedStore, StoreEntry, StoreSet};

pub use memf_ir::{Scalar, ScalarKind};
