//! Scalar types a probe can be decoded as, and their typed values.

use std::fmt;
use std::str::FromStr;

/// One of the six scalar types the scanner understands.
///
/// The discriminant is the type tag written at the head of a persisted
/// store blob. `0` is reserved for "illegal" and never produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ScalarKind {
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    F32 = 5,
    F64 = 6,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 6] = [
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::F32,
        ScalarKind::F64,
    ];

    /// Natural size in bytes. Also the probe step when scanning aligned.
    pub const fn size(self) -> usize {
        match self {
            ScalarKind::I8 => 1,
            ScalarKind::I16 => 2,
            ScalarKind::I32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::F64 => 8,
        }
    }

    /// Persisted type tag.
    pub const fn tag(self) -> u32 {
        self as u32
    }

    pub fn from_tag(tag: u32) -> Option<ScalarKind> {
        ScalarKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
    }

    pub fn from_name(name: &str) -> Option<ScalarKind> {
        ScalarKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarKind {
    type Err = ParseScalarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarKind::from_name(s).ok_or_else(|| ParseScalarError::UnknownKind(s.to_string()))
    }
}

/// Failure to interpret user-supplied scalar text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseScalarError {
    #[error("unknown scalar type '{0}' (expected one of i8 i16 i32 i64 f32 f64)")]
    UnknownKind(String),
    #[error("invalid {kind} literal '{text}'")]
    InvalidLiteral { kind: ScalarKind, text: String },
}

/// A decoded scalar, tagged with its type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scalar {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

/// The first `N` bytes of `bytes`, if there are that many.
fn take<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

impl Scalar {
    pub const fn kind(self) -> ScalarKind {
        match self {
            Scalar::I8(_) => ScalarKind::I8,
            Scalar::I16(_) => ScalarKind::I16,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::I64(_) => ScalarKind::I64,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::F64(_) => ScalarKind::F64,
        }
    }

    /// Decode the leading `kind.size()` bytes of `bytes` in native byte order.
    ///
    /// Returns `None` when fewer bytes are available.
    pub fn decode(kind: ScalarKind, bytes: &[u8]) -> Option<Scalar> {
        Some(match kind {
            ScalarKind::I8 => Scalar::I8(i8::from_ne_bytes(take(bytes)?)),
            ScalarKind::I16 => Scalar::I16(i16::from_ne_bytes(take(bytes)?)),
            ScalarKind::I32 => Scalar::I32(i32::from_ne_bytes(take(bytes)?)),
            ScalarKind::I64 => Scalar::I64(i64::from_ne_bytes(take(bytes)?)),
            ScalarKind::F32 => Scalar::F32(f32::from_ne_bytes(take(bytes)?)),
            ScalarKind::F64 => Scalar::F64(f64::from_ne_bytes(take(bytes)?)),
        })
    }

    /// The integer payload, sign-extended.
    pub const fn as_i64(self) -> Option<i64> {
        match self {
            Scalar::I8(v) => Some(v as i64),
            Scalar::I16(v) => Some(v as i64),
            Scalar::I32(v) => Some(v as i64),
            Scalar::I64(v) => Some(v),
            Scalar::F32(_) | Scalar::F64(_) => None,
        }
    }

    /// The float payload, widened.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Scalar::F32(v) => Some(f64::from(v)),
            Scalar::F64(v) => Some(v),
            _ => None,
        }
    }

    /// 64-bit persisted pattern of this value.
    pub fn to_bits(self) -> u64 {
        match self {
            Scalar::F32(v) => f64::from(v).to_bits(),
            Scalar::F64(v) => v.to_bits(),
            #[expect(
                clippy::cast_sign_loss,
                reason = "bit pattern of the sign-extended integer is what gets persisted"
            )]
            int => int.as_i64().map_or(0, |v| v as u64),
        }
    }

    /// Rebuild a value of `kind` from its persisted pattern.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "narrowing back to the persisted kind is the point"
    )]
    pub fn from_bits(kind: ScalarKind, bits: u64) -> Scalar {
        let int = bits as i64;
        match kind {
            ScalarKind::I8 => Scalar::I8(int as i8),
            ScalarKind::I16 => Scalar::I16(int as i16),
            ScalarKind::I32 => Scalar::I32(int as i32),
            ScalarKind::I64 => Scalar::I64(int),
            ScalarKind::F32 => Scalar::F32(f64::from_bits(bits) as f32),
            ScalarKind::F64 => Scalar::F64(f64::from_bits(bits)),
        }
    }

    /// Parse a literal as `kind`.
    ///
    /// Integers accept an optional sign and either base 10 or a `0x`
    /// prefix for base 16; the result is truncated to the width of `kind`.
    /// Floats accept ordinary decimal notation.
    pub fn parse(kind: ScalarKind, text: &str) -> Result<Scalar, ParseScalarError> {
        let invalid = || ParseScalarError::InvalidLiteral {
            kind,
            text: text.to_string(),
        };
        if kind.is_float() {
            let value: f64 = text.trim().parse().map_err(|_| invalid())?;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "f32 literals are rounded to single precision"
            )]
            let value = match kind {
                ScalarKind::F32 => Scalar::F32(value as f32),
                _ => Scalar::F64(value),
            };
            return Ok(value);
        }
        let int = parse_int(text.trim()).ok_or_else(invalid)?;
        Ok(Scalar::from_bits(kind, u64::from_ne_bytes(int.to_ne_bytes())))
    }
}

/// Signed base-10 or `0x` base-16 integer. Magnitudes above `i64::MAX`
/// wrap, so `0xffffffffffffffff` spells `-1`.
fn parse_int(text: &str) -> Option<i64> {
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => rest.parse::<u64>().ok()?,
    };
    let value = i64::from_ne_bytes(magnitude.to_ne_bytes());
    Some(if negative { value.wrapping_neg() } else { value })
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::I8(v) => write!(f, "{v}"),
            Scalar::I16(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
        }
    }
}
