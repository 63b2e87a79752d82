use super::*;
use pretty_assertions::assert_eq;

fn parse(args: &[&str]) -> Result<Command, ConfigError> {
    parse_args(args.iter().map(|arg| (*arg).to_string()))
}

fn config(args: &[&str]) -> Config {
    match parse(args) {
        Ok(Command::Scan(config)) => config,
        other => panic!("expected a scan, got {other:?}"),
    }
}

#[test]
fn minimal_fixed_scan() {
    let config = config(&["-p", "42", "-f", "=.i32.1337", "out.bin"]);
    assert_eq!(config.pid, 42);
    assert_eq!(config.blob, PathBuf::from("out.bin"));
    assert_eq!(config.filter, RegionFilter::default());
    assert_eq!(
        config.func,
        Some(FuncSpec {
            op: CompareOp::Eq,
            scalar_type: Some(TypeSpec {
                kind: ScalarKind::I32,
                aligned: true
            }),
            value: Some("1337".to_string()),
        })
    );
    assert!(!config.list);
    assert!(!config.verbose);
}

#[test]
fn long_options_inline_and_separate() {
    let config = config(&[
        "--pid=7",
        "--range",
        "1000..2000",
        "--mask=rw?p",
        "--list",
        "--verbose",
        "blob",
    ]);
    assert_eq!(config.pid, 7);
    assert_eq!(
        config.filter,
        RegionFilter::new(
            "rw?p".parse().expect("valid mask"),
            AddressRange::new(0x1000, 0x2000).expect("valid range"),
        )
    );
    assert!(config.list);
    assert!(config.verbose);
    assert_eq!(config.func, None);
}

#[test]
fn help_and_version_win() {
    assert_eq!(parse(&["-h"]), Ok(Command::Help));
    assert_eq!(parse(&["-p", "1", "--help", "x"]), Ok(Command::Help));
    assert_eq!(parse(&["--version"]), Ok(Command::Version));
}

#[test]
fn pid_is_required_and_nonzero() {
    assert_eq!(parse(&["-f", "<", "blob"]), Err(ConfigError::MissingPid));
    assert_eq!(
        parse(&["-p", "0", "blob"]),
        Err(ConfigError::InvalidPid("0".to_string()))
    );
    assert_eq!(
        parse(&["-p", "12ab", "blob"]),
        Err(ConfigError::InvalidPid("12ab".to_string()))
    );
}

#[test]
fn exactly_one_blob() {
    assert_eq!(parse(&["-p", "1"]), Err(ConfigError::BlobPath));
    assert_eq!(parse(&["-p", "1", "a", "b"]), Err(ConfigError::BlobPath));
}

#[test]
fn option_errors() {
    assert_eq!(
        parse(&["-p", "1", "--bogus", "blob"]),
        Err(ConfigError::UnknownOption("--bogus".to_string()))
    );
    assert_eq!(
        parse(&["blob", "-p"]),
        Err(ConfigError::MissingValue("-p".to_string()))
    );
    assert_eq!(
        parse(&["--list=yes", "-p", "1", "blob"]),
        Err(ConfigError::UnexpectedValue("--list".to_string()))
    );
}

#[test]
fn bad_range_and_mask() {
    assert_eq!(
        parse(&["-p", "1", "-r", "2000-1000", "blob"]),
        Err(ConfigError::Filter(FilterError::RangeEmpty {
            from: 0x2000,
            to: 0x1000
        }))
    );
    assert!(matches!(
        parse(&["-p", "1", "-m", "rw", "blob"]),
        Err(ConfigError::Filter(FilterError::MaskLength(_)))
    ));
}

#[test]
fn func_operator_only() {
    let spec = FuncSpec::parse(">=").expect("valid");
    assert_eq!(
        spec,
        FuncSpec {
            op: CompareOp::Ge,
            scalar_type: None,
            value: None
        }
    );
}

#[test]
fn func_keeps_float_value_whole() {
    let spec = FuncSpec::parse("<.f64.1.25").expect("valid");
    assert_eq!(spec.value.as_deref(), Some("1.25"));
    assert_eq!(
        spec.scalar_type,
        Some(TypeSpec {
            kind: ScalarKind::F64,
            aligned: true
        })
    );
}

#[test]
fn caret_disables_alignment() {
    let spec = FuncSpec::parse("!=.^i16.-3").expect("valid");
    assert_eq!(
        spec.scalar_type,
        Some(TypeSpec {
            kind: ScalarKind::I16,
            aligned: false
        })
    );
    assert_eq!(spec.value.as_deref(), Some("-3"));
}

#[test]
fn func_rejects_unknown_parts() {
    assert_eq!(
        FuncSpec::parse("==.i32.1"),
        Err(ConfigError::UnknownFunc("==".to_string()))
    );
    assert_eq!(
        FuncSpec::parse("=.u32.1"),
        Err(ConfigError::UnknownType(ParseScalarError::UnknownKind(
            "u32".to_string()
        )))
    );
}

#[test]
fn expressions() {
    let scan = config(&["-p", "1", "-t", "^f32", "-x", "(= f32 0.5)", "blob"]);
    assert_eq!(
        scan.expression,
        Some(ExprSource::Inline("(= f32 0.5)".to_string()))
    );
    assert_eq!(
        scan.scalar_type,
        Some(TypeSpec {
            kind: ScalarKind::F32,
            aligned: false
        })
    );

    let scan = config(&["-p", "1", "--expr-file=prog.lisp", "blob"]);
    assert_eq!(
        scan.expression,
        Some(ExprSource::File(PathBuf::from("prog.lisp")))
    );

    assert_eq!(
        parse(&["-p", "1", "-x", "i8", "-X", "p", "blob"]),
        Err(ConfigError::ConflictingExpressions)
    );
}

#[test]
fn expression_values_may_look_like_options() {
    let config = config(&["-p", "1", "-t", "i32", "-x", "-1", "blob"]);
    assert_eq!(config.expression, Some(ExprSource::Inline("-1".to_string())));
}
