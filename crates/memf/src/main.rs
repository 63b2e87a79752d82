//! Memf command-line entry point.

use std::error::Error;

use memf::{init_tracing, parse_args, run, Command, RunError, USAGE};

fn main() {
    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("memf: error: {err}");
            eprintln!("Try 'memf --help' for more information.");
            std::process::exit(1);
        }
    };

    match command {
        Command::Help => print!("{USAGE}"),
        Command::Version => println!("memf {}", env!("CARGO_PKG_VERSION")),
        Command::Scan(config) => {
            init_tracing(config.verbose);
            let stdout = std::io::stdout();
            if let Err(err) = run(&config, &mut stdout.lock()) {
                report(&err);
                std::process::exit(err.exit_code());
            }
        }
    }
}

fn report(err: &RunError) {
    let kind = if err.is_internal() {
        "internal error"
    } else {
        "error"
    };
    eprintln!("memf: {kind}: {err}");
    let mut cause = err.source();
    while let Some(inner) = cause {
        eprintln!("  caused by: {inner}");
        cause = inner.source();
    }
}
