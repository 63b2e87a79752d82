//! Region scanning and store narrowing.
//!
//! A fresh scan ([`scan_regions`]) walks every selected region probe by
//! probe. Narrowing ([`narrow_store`]) only revisits addresses a previous
//! scan stored, so it ignores the region filter entirely.

use std::fmt;

use memf_ir::{Scalar, ScalarKind};
use memf_lisp::{Builtins, Evaluator, ValidProgram, Value};
use tracing::{debug, trace};

use crate::compare::{compare, CompareOp, Comparison};
use crate::error::{RegionFault, ScanError};
use crate::filter::RegionFilter;
use crate::memory::MemorySource;
use crate::region::Region;
use crate::store::{StoreEntry, StoreSet};

/// A compiled predicate program bound to its builtin environment.
#[derive(Copy, Clone, Debug)]
pub struct ExpressionPredicate<'p> {
    program: &'p ValidProgram,
    evaluator: Evaluator<'p>,
}

impl<'p> ExpressionPredicate<'p> {
    pub fn new(program: &'p ValidProgram, builtins: &'p Builtins) -> Self {
        ExpressionPredicate {
            program,
            evaluator: Evaluator::new(builtins),
        }
    }

    /// Evaluate with the typed variables reading from `probe`.
    pub fn evaluate(&self, probe: &[u8]) -> Value {
        self.evaluator.evaluate(self.program, probe)
    }
}

/// What decides whether a probe matches.
#[derive(Copy, Clone, Debug)]
pub enum Predicate<'p> {
    Fixed(Comparison),
    /// Matches when the program evaluates to `true`. Any other result,
    /// illegal included, is a miss.
    Expression(ExpressionPredicate<'p>),
}

/// Everything a fresh scan needs.
#[derive(Copy, Clone, Debug)]
pub struct ScanPlan<'p> {
    pub kind: ScalarKind,
    /// Step by the scalar size rather than by single bytes.
    pub aligned: bool,
    pub filter: RegionFilter,
    pub predicate: Predicate<'p>,
}

impl ScanPlan<'_> {
    pub fn step(&self) -> usize {
        if self.aligned {
            self.kind.size()
        } else {
            1
        }
    }
}

/// A region left out of the scan because it could not be read.
#[derive(Debug)]
pub struct SkippedRegion {
    /// Position in the full mapping listing.
    pub index: usize,
    pub region: Region,
    pub fault: RegionFault,
}

/// Counters describing one scan or narrowing pass.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub regions_scanned: usize,
    pub skipped: Vec<SkippedRegion>,
    pub probes: u64,
    /// Expression results that were not a boolean.
    pub non_boolean: u64,
    /// Stored addresses that could no longer be read.
    pub unreadable: usize,
}

/// Addresses in log fields.
struct Hex(u64);

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// ─── Fresh scan ───

/// Test every probe of every region `plan.filter` selects.
///
/// A region that cannot be read is skipped and listed in the report. The
/// scan only fails when result storage cannot grow.
#[tracing::instrument(level = "debug", skip_all, fields(kind = %plan.kind, aligned = plan.aligned))]
pub fn scan_regions<M: MemorySource + ?Sized>(
    regions: &[Region],
    memory: &M,
    plan: &ScanPlan<'_>,
) -> Result<(StoreSet, ScanReport), ScanError> {
    let mut store = StoreSet::new(plan.kind);
    let mut report = ScanReport::default();

    for (index, region) in regions.iter().enumerate() {
        if !plan.filter.accepts(region) {
            trace!(index, region = %region, "region filtered out");
            continue;
        }
        let bytes = match read_region(memory, region) {
            Ok(bytes) => bytes,
            Err(fault) => {
                debug!(index, region = %region, %fault, "skipping unreadable region");
                report.skipped.push(SkippedRegion {
                    index,
                    region: region.clone(),
                    fault,
                });
                continue;
            }
        };

        let before = store.len();
        scan_bytes(region.from, &bytes, plan, &mut store, &mut report)?;
        report.regions_scanned += 1;
        debug!(index, matches = store.len() - before, "scanned region");
    }

    Ok((store, report))
}

/// Copy a whole region out of the target.
fn read_region<M: MemorySource + ?Sized>(
    memory: &M,
    region: &Region,
) -> Result<Vec<u8>, RegionFault> {
    let out_of_memory = || RegionFault::OutOfMemory {
        bytes: region.len(),
    };
    let len = usize::try_from(region.len()).map_err(|_| out_of_memory())?;
    let mut bytes = Vec::new();
    bytes.try_reserve_exact(len).map_err(|_| out_of_memory())?;
    bytes.resize(len, 0);
    memory.read_exact_at(region.from, &mut bytes)?;
    Ok(bytes)
}

/// Probe `bytes`, which start at address `base`. A probe is only taken
/// where a whole scalar fits.
fn scan_bytes(
    base: u64,
    bytes: &[u8],
    plan: &ScanPlan<'_>,
    store: &mut StoreSet,
    report: &mut ScanReport,
) -> Result<(), ScanError> {
    let Some(last) = bytes.len().checked_sub(plan.kind.size()) else {
        return Ok(());
    };
    for offset in (0..=last).step_by(plan.step()) {
        let window = &bytes[offset..];
        let Some(value) = Scalar::decode(plan.kind, window) else {
            continue;
        };
        report.probes += 1;
        let address = base + offset as u64;
        let hit = match &plan.predicate {
            Predicate::Fixed(comparison) => comparison.matches(value),
            Predicate::Expression(expression) => match expression.evaluate(window) {
                Value::Bool(hit) => hit,
                other => {
                    report.non_boolean += 1;
                    trace!(address = %Hex(address), result = %other, "non-boolean predicate result");
                    false
                }
            },
        };
        if hit {
            store.try_push(StoreEntry { address, value })?;
        }
    }
    Ok(())
}

// ─── Narrowing ───

/// The reference each stored address is compared against.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Baseline {
    /// One value for every entry. Must be of the store's kind.
    Fixed(Scalar),
    /// Each entry's own recorded value.
    Previous,
}

/// Re-read every stored address and keep those where
/// `current <op> baseline` holds. Survivors take on their current value.
///
/// An address that can no longer be read is dropped.
#[tracing::instrument(level = "debug", skip_all, fields(kind = %store.kind(), entries = store.len(), op = %op))]
pub fn narrow_store<M: MemorySource + ?Sized>(
    store: &mut StoreSet,
    memory: &M,
    op: CompareOp,
    baseline: Baseline,
) -> ScanReport {
    let kind = store.kind();
    let mut report = ScanReport::default();
    let mut scratch = [0u8; 8];
    let buf = &mut scratch[..kind.size()];

    store.entries_mut().retain_mut(|entry| {
        if let Err(err) = memory.read_exact_at(entry.address, buf) {
            debug!(address = %Hex(entry.address), %err, "dropping unreadable entry");
            report.unreadable += 1;
            return false;
        }
        let Some(current) = Scalar::decode(kind, buf) else {
            return false;
        };
        report.probes += 1;
        let reference = match baseline {
            Baseline::Fixed(value) => value,
            Baseline::Previous => entry.value,
        };
        entry.value = current;
        compare(op, current, reference)
    });

    debug!(kept = store.len(), "narrowed store");
    report
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
