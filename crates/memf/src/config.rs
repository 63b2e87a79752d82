//! Command-line configuration.
//!
//! ```text
//! memf [options] <blob>
//! ```
//!
//! Options take their value either as the next argument (`-p 42`,
//! `--pid 42`) or inline (`--pid=42`). The blob path is both the input of
//! a narrowing pass (when the file exists) and the output of every scan.

use std::path::PathBuf;

use memf_ir::{ParseScalarError, ScalarKind};
use memf_scan::{AddressRange, CompareOp, FilterError, PermissionMask, RegionFilter};

pub const USAGE: &str = "\
Usage: memf [options] <blob>

Options:
  -h, --help              Show this message
      --version           Show version information
  -V, --verbose           Narrate skipped regions and per-region results
  -p, --pid PID           Process to inspect, in base 10 (required)
  -r, --range FROM-TO     Only regions overlapping [FROM, TO), base 16 without
                          0x prefix (FROM..TO also accepted)
                          Default: 0-7fffffffffffffff
  -m, --mask MASK         Permission mask, '?' matches anything
                          Default: r?-p (readable, non-executable, private)
  -f, --func FUNC[.TYPE.VALUE]
                          FUNC is one of = != < > <= >=
                          TYPE is one of i8 i16 i32 i64 f32 f64; prefix it
                          with ^ to scan byte by byte instead of aligned
                          VALUE is base 10 or 0x-prefixed base 16
  -t, --type TYPE         Scalar type for expression scans (same ^ rule)
  -x, --expr PROGRAM      Match where PROGRAM evaluates to true
  -X, --expr-file PATH    Read PROGRAM from PATH
  -l, --list              Print every matching address and value

If <blob> exists, only the addresses it holds are re-tested: TYPE comes from
the blob, --range and --mask have no effect, and without a VALUE each address
is compared with its previously recorded value.

Examples:
  memf -p 4242 -f =.i32.1337 hp.bin     # first scan
  memf -p 4242 -f '<' hp.bin            # keep values that decreased
  memf -p 4242 -f =.i32.1300 hp.bin     # keep values now equal to 1300
  memf -p 4242 -t f32 -x '(= f32 0.5)' speed.bin
";

/// Missing or malformed configuration.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("option '{0}' requires a value")]
    MissingValue(String),
    #[error("option '{0}' does not take a value")]
    UnexpectedValue(String),
    #[error("pid is not set")]
    MissingPid,
    #[error("invalid pid '{0}'")]
    InvalidPid(String),
    #[error("where to output? expected exactly one blob path")]
    BlobPath,
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("illegal function '{0}'")]
    UnknownFunc(String),
    #[error("illegal type: {0}")]
    UnknownType(ParseScalarError),
    #[error(transparent)]
    InvalidValue(ParseScalarError),
    #[error("illegal function: --func is required")]
    MissingFunc,
    #[error("--func must be FUNC.TYPE.VALUE for a fresh scan")]
    IncompleteFunc,
    #[error("--expr and --expr-file are mutually exclusive")]
    ConflictingExpressions,
    #[error("--func cannot be combined with an expression")]
    ExpressionWithFunc,
    #[error("an expression scan needs --type")]
    ExpressionWithoutType,
    #[error("expression scans start fresh, but {} already exists", .0.display())]
    ExpressionWithBlob(PathBuf),
}

// ─── Option values ───

/// A scalar type plus the alignment choice that rides on it (`^i32`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeSpec {
    pub kind: ScalarKind,
    pub aligned: bool,
}

impl TypeSpec {
    pub fn parse(text: &str) -> Result<TypeSpec, ConfigError> {
        let (aligned, name) = match text.strip_prefix('^') {
            Some(name) => (false, name),
            None => (true, text),
        };
        let kind = name.parse().map_err(ConfigError::UnknownType)?;
        Ok(TypeSpec { kind, aligned })
    }
}

/// `--func FUNC[.TYPE[.VALUE]]`. The value stays text until the scalar
/// kind is settled, which may come from a blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncSpec {
    pub op: CompareOp,
    pub scalar_type: Option<TypeSpec>,
    pub value: Option<String>,
}

impl FuncSpec {
    pub fn parse(text: &str) -> Result<FuncSpec, ConfigError> {
        // At most three parts, so float values keep their decimal point.
        let mut parts = text.splitn(3, '.');
        let op_text = parts.next().unwrap_or_default();
        let op = op_text
            .parse()
            .map_err(|_| ConfigError::UnknownFunc(op_text.to_string()))?;
        let scalar_type = parts.next().map(TypeSpec::parse).transpose()?;
        let value = parts.next().map(str::to_string);
        Ok(FuncSpec {
            op,
            scalar_type,
            value,
        })
    }
}

/// Where the predicate program comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprSource {
    Inline(String),
    File(PathBuf),
}

// ─── Config ───

/// Everything one invocation needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub pid: u32,
    pub filter: RegionFilter,
    pub func: Option<FuncSpec>,
    pub scalar_type: Option<TypeSpec>,
    pub expression: Option<ExprSource>,
    pub list: bool,
    pub verbose: bool,
    pub blob: PathBuf,
}

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Help,
    Version,
    Scan(Config),
}

/// Parse the arguments after the program name.
pub fn parse_args<I>(args: I) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut pid = None;
    let mut mask = PermissionMask::default();
    let mut range = AddressRange::default();
    let mut func = None;
    let mut scalar_type = None;
    let mut expression = None;
    let mut list = false;
    let mut verbose = false;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg);
            continue;
        }
        let (name, inline) = match arg.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };

        // Flags.
        let flag = match name {
            "-h" | "--help" => Some(Flag::Help),
            "--version" => Some(Flag::Version),
            "-V" | "--verbose" => Some(Flag::Verbose),
            "-l" | "--list" => Some(Flag::List),
            _ => None,
        };
        if let Some(flag) = flag {
            if inline.is_some() {
                return Err(ConfigError::UnexpectedValue(name.to_string()));
            }
            match flag {
                Flag::Help => return Ok(Command::Help),
                Flag::Version => return Ok(Command::Version),
                Flag::Verbose => verbose = true,
                Flag::List => list = true,
            }
            continue;
        }

        // Options with a value.
        if !matches!(
            name,
            "-p" | "--pid"
                | "-r"
                | "--range"
                | "-m"
                | "--mask"
                | "-f"
                | "--func"
                | "-t"
                | "--type"
                | "-x"
                | "--expr"
                | "-X"
                | "--expr-file"
        ) {
            return Err(ConfigError::UnknownOption(arg));
        }
        let value = match inline {
            Some(value) => value,
            None => args
                .next()
                .ok_or_else(|| ConfigError::MissingValue(name.to_string()))?,
        };
        match name {
            "-p" | "--pid" => pid = Some(parse_pid(&value)?),
            "-r" | "--range" => range = value.parse()?,
            "-m" | "--mask" => mask = value.parse()?,
            "-f" | "--func" => func = Some(FuncSpec::parse(&value)?),
            "-t" | "--type" => scalar_type = Some(TypeSpec::parse(&value)?),
            "-x" | "--expr" => {
                set_expression(&mut expression, ExprSource::Inline(value))?;
            }
            _ => set_expression(&mut expression, ExprSource::File(PathBuf::from(value)))?,
        }
    }

    let pid = pid.ok_or(ConfigError::MissingPid)?;
    let [blob] = <[String; 1]>::try_from(positional).map_err(|_| ConfigError::BlobPath)?;
    Ok(Command::Scan(Config {
        pid,
        filter: RegionFilter::new(mask, range),
        func,
        scalar_type,
        expression,
        list,
        verbose,
        blob: PathBuf::from(blob),
    }))
}

enum Flag {
    Help,
    Version,
    Verbose,
    List,
}

fn parse_pid(text: &str) -> Result<u32, ConfigError> {
    match text.parse::<u32>() {
        Ok(pid) if pid != 0 => Ok(pid),
        _ => Err(ConfigError::InvalidPid(text.to_string())),
    }
}

fn set_expression(slot: &mut Option<ExprSource>, source: ExprSource) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::ConflictingExpressions);
    }
    *slot = Some(source);
    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
