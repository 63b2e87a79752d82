//! Memf - find and narrow values in the memory of a running process.
//!
//! A first invocation scans the target's readable regions for a value (or
//! for addresses where a predicate program holds) and saves the matches to
//! a blob. Later invocations with the same blob only re-test those
//! addresses, narrowing the set as the value changes in the target.
//!
//! The binary is a thin shell around [`parse_args`] and [`run`].

mod config;
mod logging;
mod scan;

pub use config::{parse_args, Command, Config, ConfigError, ExprSource, FuncSpec, TypeSpec, USAGE};
pub use logging::{default_directives, init_tracing};
pub use scan::{execute, resolve_mode, run, write_results, Mode, RunError};
