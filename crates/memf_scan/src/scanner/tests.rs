use super::*;
use crate::filter::{AddressRange, PermissionMask};
use crate::region::Permissions;
use pretty_assertions::assert_eq;
use std::io;

/// Readable memory made of disjoint segments.
struct FakeMemory {
    segments: Vec<(u64, Vec<u8>)>,
}

impl FakeMemory {
    fn new() -> Self {
        FakeMemory {
            segments: Vec::new(),
        }
    }

    fn segment(mut self, base: u64, bytes: Vec<u8>) -> Self {
        self.segments.push((base, bytes));
        self
    }

    fn write(&mut self, address: u64, data: &[u8]) {
        for (base, bytes) in &mut self.segments {
            if address >= *base {
                let start = (address - *base) as usize;
                if start + data.len() <= bytes.len() {
                    bytes[start..start + data.len()].copy_from_slice(data);
                    return;
                }
            }
        }
        panic!("write outside fake memory at {address:#x}");
    }
}

impl MemorySource for FakeMemory {
    fn read_exact_at(&self, address: u64, buf: &mut [u8]) -> io::Result<()> {
        for (base, bytes) in &self.segments {
            if address >= *base {
                let start = (address - *base) as usize;
                if let Some(src) = bytes.get(start..start + buf.len()) {
                    buf.copy_from_slice(src);
                    return Ok(());
                }
            }
        }
        Err(io::Error::from(io::ErrorKind::UnexpectedEof))
    }
}

fn region(from: u64, to: u64, perms: &str) -> Region {
    Region {
        from,
        to,
        perms: Permissions::parse(perms).expect("valid permissions"),
        offset: 0,
        dev_major: 0,
        dev_minor: 0,
        inode: 0,
        path: None,
    }
}

/// 32 zero bytes at `base` with `value` planted at each offset.
fn planted_i32(base: u64, value: i32, offsets: &[usize]) -> (u64, Vec<u8>) {
    let mut bytes = vec![0u8; 32];
    for &offset in offsets {
        bytes[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    }
    (base, bytes)
}

fn fixed_plan(reference: Scalar, aligned: bool) -> ScanPlan<'static> {
    ScanPlan {
        kind: reference.kind(),
        aligned,
        filter: RegionFilter::default(),
        predicate: Predicate::Fixed(Comparison::new(CompareOp::Eq, reference)),
    }
}

fn addresses(store: &StoreSet) -> Vec<u64> {
    store.iter().map(|entry| entry.address).collect()
}

// ─── Fresh scans ───

#[test]
fn aligned_scan_finds_aligned_values_only() {
    let (base, bytes) = planted_i32(0x1000, 42, &[0, 8, 17]);
    let memory = FakeMemory::new().segment(base, bytes);
    let regions = [region(0x1000, 0x1020, "rw-p")];

    let (store, report) =
        scan_regions(&regions, &memory, &fixed_plan(Scalar::I32(42), true)).expect("scans");
    assert_eq!(addresses(&store), vec![0x1000, 0x1008]);
    assert_eq!(report.regions_scanned, 1);
    assert_eq!(report.probes, 8);
}

#[test]
fn unaligned_scan_steps_one_byte() {
    let (base, bytes) = planted_i32(0x1000, 42, &[0, 8, 17]);
    let memory = FakeMemory::new().segment(base, bytes);
    let regions = [region(0x1000, 0x1020, "rw-p")];

    let (store, report) =
        scan_regions(&regions, &memory, &fixed_plan(Scalar::I32(42), false)).expect("scans");
    assert_eq!(addresses(&store), vec![0x1000, 0x1008, 0x1011]);
    assert_eq!(report.probes, 29);
}

#[test]
fn probes_never_run_past_region_end() {
    let memory = FakeMemory::new().segment(0x1000, vec![0xff; 6]);
    let regions = [region(0x1000, 0x1006, "rw-p")];

    let (_, aligned) =
        scan_regions(&regions, &memory, &fixed_plan(Scalar::I32(-1), true)).expect("scans");
    assert_eq!(aligned.probes, 1);

    let (store, unaligned) =
        scan_regions(&regions, &memory, &fixed_plan(Scalar::I32(-1), false)).expect("scans");
    assert_eq!(unaligned.probes, 3);
    assert_eq!(addresses(&store), vec![0x1000, 0x1001, 0x1002]);
}

#[test]
fn region_smaller_than_scalar_has_no_probes() {
    let memory = FakeMemory::new().segment(0x1000, vec![0; 4]);
    let regions = [region(0x1000, 0x1004, "rw-p")];
    let (store, report) =
        scan_regions(&regions, &memory, &fixed_plan(Scalar::I64(0), true)).expect("scans");
    assert!(store.is_empty());
    assert_eq!(report.probes, 0);
    assert_eq!(report.regions_scanned, 1);
}

#[test]
fn filtered_regions_are_not_read() {
    let memory = FakeMemory::new()
        .segment(0x1000, vec![7; 16])
        .segment(0x2000, vec![7; 16]);
    let regions = [
        region(0x1000, 0x1010, "rwxp"),
        region(0x2000, 0x2010, "r--p"),
    ];
    let (store, report) =
        scan_regions(&regions, &memory, &fixed_plan(Scalar::I8(7), true)).expect("scans");
    assert_eq!(report.regions_scanned, 1);
    assert_eq!(store.len(), 16);
    assert!(store.iter().all(|entry| entry.address >= 0x2000));
}

#[test]
fn overlapping_region_is_scanned_whole() {
    let (base, bytes) = planted_i32(0x1000, 5, &[0, 28]);
    let memory = FakeMemory::new().segment(base, bytes);
    let regions = [region(0x1000, 0x1020, "rw-p")];
    let plan = ScanPlan {
        filter: RegionFilter::new(
            PermissionMask::default(),
            AddressRange::new(0x1010, 0x1014).expect("valid range"),
        ),
        ..fixed_plan(Scalar::I32(5), true)
    };
    let (store, _) = scan_regions(&regions, &memory, &plan).expect("scans");
    assert_eq!(addresses(&store), vec![0x1000, 0x101c]);
}

#[test]
fn unreadable_region_is_skipped_and_reported() {
    let memory = FakeMemory::new().segment(0x3000, vec![1; 8]);
    let regions = [
        region(0x1000, 0x1010, "rw-p"),
        region(0x3000, 0x3008, "rw-p"),
    ];
    let (store, report) =
        scan_regions(&regions, &memory, &fixed_plan(Scalar::I8(1), true)).expect("scans");
    assert_eq!(store.len(), 8);
    assert_eq!(report.regions_scanned, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 0);
    assert!(matches!(report.skipped[0].fault, RegionFault::Io(_)));
}

#[test]
fn oversized_region_is_skipped_as_out_of_memory() {
    let memory = FakeMemory::new().segment(0x1000, 5i32.to_ne_bytes().to_vec());
    let regions = [
        region(0x10_0000, u64::MAX, "rw-p"),
        region(0x1000, 0x1004, "rw-p"),
    ];
    let (store, report) =
        scan_regions(&regions, &memory, &fixed_plan(Scalar::I32(5), true)).expect("scans");

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 0);
    assert!(matches!(
        report.skipped[0].fault,
        RegionFault::OutOfMemory { bytes } if bytes == u64::MAX - 0x10_0000
    ));
    assert_eq!(report.regions_scanned, 1);
    assert_eq!(addresses(&store), vec![0x1000]);
}

#[test]
fn stored_values_are_the_decoded_probes() {
    let mut bytes = vec![0u8; 16];
    bytes[8..16].copy_from_slice(&2.5f64.to_ne_bytes());
    let memory = FakeMemory::new().segment(0x4000, bytes);
    let regions = [region(0x4000, 0x4010, "r--p")];
    let plan = ScanPlan {
        predicate: Predicate::Fixed(Comparison::new(CompareOp::Gt, Scalar::F64(1.0))),
        ..fixed_plan(Scalar::F64(0.0), true)
    };
    let (store, _) = scan_regions(&regions, &memory, &plan).expect("scans");
    assert_eq!(
        store.entries(),
        &[StoreEntry {
            address: 0x4008,
            value: Scalar::F64(2.5)
        }]
    );
}

// ─── Expression predicates ───

fn expression_plan<'p>(
    program: &'p ValidProgram,
    builtins: &'p Builtins,
    kind: ScalarKind,
) -> ScanPlan<'p> {
    ScanPlan {
        kind,
        aligned: true,
        filter: RegionFilter::default(),
        predicate: Predicate::Expression(ExpressionPredicate::new(program, builtins)),
    }
}

#[test]
fn expression_matches_on_true() {
    let (base, bytes) = planted_i32(0x1000, 1337, &[4, 20]);
    let memory = FakeMemory::new().segment(base, bytes);
    let regions = [region(0x1000, 0x1020, "rw-p")];
    let builtins = Builtins::new();
    let program = memf_lisp::compile("(= i32 1337)").expect("valid program");

    let (store, report) = scan_regions(
        &regions,
        &memory,
        &expression_plan(&program, &builtins, ScalarKind::I32),
    )
    .expect("scans");
    assert_eq!(addresses(&store), vec![0x1004, 0x1014]);
    assert_eq!(report.non_boolean, 0);
}

#[test]
fn expression_can_read_other_kinds() {
    let mut bytes = vec![0u8; 16];
    bytes[0] = 3;
    bytes[8] = 200;
    let memory = FakeMemory::new().segment(0x1000, bytes);
    let regions = [region(0x1000, 0x1010, "rw-p")];
    let builtins = Builtins::new();
    let program = memf_lisp::compile("(= (- i8 3) 0)").expect("valid program");

    let (store, _) = scan_regions(
        &regions,
        &memory,
        &expression_plan(&program, &builtins, ScalarKind::I64),
    )
    .expect("scans");
    assert_eq!(
        store.entries(),
        &[StoreEntry {
            address: 0x1000,
            value: Scalar::I64(3)
        }]
    );
}

#[test]
fn non_boolean_results_never_match() {
    let memory = FakeMemory::new().segment(0x1000, vec![0; 16]);
    let regions = [region(0x1000, 0x1010, "rw-p")];
    let builtins = Builtins::new();
    let program = memf_lisp::compile("(+ i32 1)").expect("valid program");

    let (store, report) = scan_regions(
        &regions,
        &memory,
        &expression_plan(&program, &builtins, ScalarKind::I32),
    )
    .expect("scans");
    assert!(store.is_empty());
    assert_eq!(report.probes, 4);
    assert_eq!(report.non_boolean, 4);
}

// ─── Narrowing ───

fn stored(kind: ScalarKind, entries: &[(u64, Scalar)]) -> StoreSet {
    StoreSet::from_entries(
        kind,
        entries
            .iter()
            .map(|&(address, value)| StoreEntry { address, value })
            .collect(),
    )
}

#[test]
fn narrowing_against_previous_values() {
    let mut memory = FakeMemory::new().segment(0x1000, vec![0; 16]);
    memory.write(0x1000, &10i32.to_ne_bytes());
    memory.write(0x1004, &11i32.to_ne_bytes());
    memory.write(0x1008, &9i32.to_ne_bytes());
    let mut store = stored(
        ScalarKind::I32,
        &[
            (0x1000, Scalar::I32(10)),
            (0x1004, Scalar::I32(10)),
            (0x1008, Scalar::I32(10)),
        ],
    );

    let report = narrow_store(&mut store, &memory, CompareOp::Gt, Baseline::Previous);
    assert_eq!(
        store.entries(),
        &[StoreEntry {
            address: 0x1004,
            value: Scalar::I32(11)
        }]
    );
    assert_eq!(report.probes, 3);
}

#[test]
fn narrowing_against_fixed_value_refreshes_survivors() {
    let mut memory = FakeMemory::new().segment(0x1000, vec![0; 16]);
    memory.write(0x1000, &100i16.to_ne_bytes());
    memory.write(0x1002, &50i16.to_ne_bytes());
    let mut store = stored(
        ScalarKind::I16,
        &[(0x1000, Scalar::I16(1)), (0x1002, Scalar::I16(2))],
    );

    narrow_store(
        &mut store,
        &memory,
        CompareOp::Eq,
        Baseline::Fixed(Scalar::I16(100)),
    );
    assert_eq!(
        store.entries(),
        &[StoreEntry {
            address: 0x1000,
            value: Scalar::I16(100)
        }]
    );
}

#[test]
fn narrowing_drops_unreadable_addresses() {
    let memory = FakeMemory::new().segment(0x1000, vec![0; 8]);
    let mut store = stored(
        ScalarKind::I64,
        &[(0x1000, Scalar::I64(0)), (0x9000, Scalar::I64(0))],
    );

    let report = narrow_store(&mut store, &memory, CompareOp::Eq, Baseline::Previous);
    assert_eq!(addresses(&store), vec![0x1000]);
    assert_eq!(report.unreadable, 1);
}

#[test]
fn narrowing_reads_only_the_scalar_width() {
    // The entry sits on the last byte of memory; an 8-byte read would fail.
    let memory = FakeMemory::new().segment(0x1000, vec![0, 0, 0, 5]);
    let mut store = stored(ScalarKind::I8, &[(0x1003, Scalar::I8(4))]);

    narrow_store(&mut store, &memory, CompareOp::Gt, Baseline::Previous);
    assert_eq!(addresses(&store), vec![0x1003]);
    assert_eq!(store.entries()[0].value, Scalar::I8(5));
}
