//! One invocation: pick the predicate mode, scan or narrow, report,
//! persist.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use memf_ir::Scalar;
use memf_lisp::{Builtins, SyntaxError, ValidProgram};
use memf_scan::{
    narrow_store, scan_regions, Baseline, CompareOp, Comparison, ExpressionPredicate,
    MemorySource, Predicate, Process, Region, RegionFilter, ScanError, ScanPlan, ScanReport,
    StoreError, StoreSet,
};
use tracing::{debug, info};

use crate::config::{Config, ConfigError, ExprSource, TypeSpec};

/// Failures of a scan invocation.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read expression file {}", .path.display())]
    ExprFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid expression: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("cannot load {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// The results were computed and reported but not saved.
    #[error("failed to write {}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error("cannot write results")]
    Output(#[from] io::Error),
}

impl RunError {
    /// A fault in data the kernel is trusted to get right.
    pub fn is_internal(&self) -> bool {
        matches!(self, RunError::Scan(ScanError::Maps(_)))
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_internal() {
            70
        } else {
            1
        }
    }
}

/// The predicate mode of one invocation.
#[derive(Debug)]
pub enum Mode {
    /// Scan every selected region against one fixed value.
    Fixed {
        scalar: TypeSpec,
        comparison: Comparison,
    },
    /// Re-test the addresses of a previous scan.
    Carried {
        store: StoreSet,
        op: CompareOp,
        baseline: Baseline,
    },
    /// Scan every selected region with a predicate program.
    Expression {
        scalar: TypeSpec,
        program: ValidProgram,
    },
}

/// Decide the mode from the configuration, the blob's previous contents
/// and the compiled expression, if any.
pub fn resolve_mode(
    config: &Config,
    previous: Option<StoreSet>,
    program: Option<ValidProgram>,
) -> Result<Mode, ConfigError> {
    if let Some(program) = program {
        if config.func.is_some() {
            return Err(ConfigError::ExpressionWithFunc);
        }
        if previous.is_some() {
            return Err(ConfigError::ExpressionWithBlob(config.blob.clone()));
        }
        let scalar = config
            .scalar_type
            .ok_or(ConfigError::ExpressionWithoutType)?;
        return Ok(Mode::Expression { scalar, program });
    }

    let func = config.func.as_ref().ok_or(ConfigError::MissingFunc)?;
    if let Some(store) = previous {
        if func.scalar_type.is_some_and(|spec| spec.kind != store.kind()) {
            debug!(kind = %store.kind(), "type in --func ignored, the blob decides");
        }
        let baseline = match &func.value {
            Some(text) => Baseline::Fixed(
                Scalar::parse(store.kind(), text).map_err(ConfigError::InvalidValue)?,
            ),
            None => Baseline::Previous,
        };
        return Ok(Mode::Carried {
            store,
            op: func.op,
            baseline,
        });
    }

    let (Some(scalar), Some(text)) = (func.scalar_type, func.value.as_deref()) else {
        return Err(ConfigError::IncompleteFunc);
    };
    let reference = Scalar::parse(scalar.kind, text).map_err(ConfigError::InvalidValue)?;
    Ok(Mode::Fixed {
        scalar,
        comparison: Comparison::new(func.op, reference),
    })
}

/// Run `mode` against a target's regions and memory.
pub fn execute<M: MemorySource + ?Sized>(
    mode: Mode,
    filter: RegionFilter,
    regions: &[Region],
    memory: &M,
) -> Result<(StoreSet, ScanReport), ScanError> {
    match mode {
        Mode::Fixed { scalar, comparison } => {
            let plan = ScanPlan {
                kind: scalar.kind,
                aligned: scalar.aligned,
                filter,
                predicate: Predicate::Fixed(comparison),
            };
            scan_regions(regions, memory, &plan)
        }
        Mode::Expression { scalar, program } => {
            let builtins = Builtins::new();
            let plan = ScanPlan {
                kind: scalar.kind,
                aligned: scalar.aligned,
                filter,
                predicate: Predicate::Expression(ExpressionPredicate::new(&program, &builtins)),
            };
            scan_regions(regions, memory, &plan)
        }
        Mode::Carried {
            mut store,
            op,
            baseline,
        } => {
            let report = narrow_store(&mut store, memory, op, baseline);
            Ok((store, report))
        }
    }
}

/// Print the results: one `address value` line per entry when `list` is
/// set, then the match count.
pub fn write_results<W: Write>(store: &StoreSet, list: bool, out: &mut W) -> io::Result<()> {
    if list {
        for entry in store {
            writeln!(out, "{:016x} {}", entry.address, entry.value)?;
        }
    }
    writeln!(out, "{} matches", store.len())
}

/// The whole invocation. Results go to `out`; the store is saved to the
/// blob path even when empty.
///
/// The expression is compiled before the target is touched, so a bad
/// program never produces a partial scan.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<StoreSet, RunError> {
    let program = config.expression.as_ref().map(load_program).transpose()?;

    let previous = StoreSet::load(&config.blob)
        .map_err(|source| RunError::Load {
            path: config.blob.clone(),
            source,
        })?
        .map(|loaded| loaded.store);
    let mode = resolve_mode(config, previous, program)?;
    if matches!(mode, Mode::Carried { .. }) && config.filter != RegionFilter::default() {
        debug!("--range and --mask have no effect when narrowing");
    }

    let process = Process::open(config.pid)?;
    let (store, report) = execute(mode, config.filter, process.regions(), process.memory())?;
    info!(
        pid = config.pid,
        regions = report.regions_scanned,
        skipped = report.skipped.len(),
        probes = report.probes,
        non_boolean = report.non_boolean,
        unreadable = report.unreadable,
        matches = store.len(),
        "scan finished"
    );

    write_results(&store, config.list, out)?;
    out.flush()?;
    store.save(&config.blob).map_err(|source| RunError::Persist {
        path: config.blob.clone(),
        source,
    })?;
    Ok(store)
}

fn load_program(source: &ExprSource) -> Result<ValidProgram, RunError> {
    let text = match source {
        ExprSource::Inline(text) => text.clone(),
        ExprSource::File(path) => {
            fs::read_to_string(path).map_err(|source| RunError::ExprFile {
                path: path.clone(),
                source,
            })?
        }
    };
    Ok(memf_lisp::compile(&text)?)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
