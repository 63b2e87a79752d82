//! Diagnostic output on stderr.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Crates whose events `--verbose` turns up to debug.
const MEMF_CRATES: [&str; 4] = ["memf", "memf_ir", "memf_lisp", "memf_scan"];

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(verbose: bool) -> String {
    let mut directives = vec!["warn".to_string()];
    if verbose {
        directives.extend(MEMF_CRATES.iter().map(|name| format!("{name}=debug")));
    }
    directives.join(",")
}

/// Install the stderr subscriber. `RUST_LOG` overrides the defaults.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    });
}
