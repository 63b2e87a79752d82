//! Region selection by permission mask and address interval.

use std::fmt;
use std::str::FromStr;

use crate::region::Region;

/// Invalid `--mask` or `--range` text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("permission mask must be 4 characters, got {0:?}")]
    MaskLength(String),
    #[error("range {0:?} is not FROM-TO")]
    RangeShape(String),
    #[error("invalid hexadecimal address {0:?}")]
    RangeAddress(String),
    #[error("range start {from:#x} is not below end {to:#x}")]
    RangeEmpty { from: u64, to: u64 },
}

// ─── Permission mask ───

/// A 4-character pattern over [`Permissions`](crate::Permissions).
/// `?` matches anything; every other character must match exactly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PermissionMask([u8; 4]);

impl PermissionMask {
    /// Readable private mappings, whatever the write and execute bits.
    pub const DEFAULT: PermissionMask = PermissionMask(*b"r?-p");

    pub fn matches(&self, region: &Region) -> bool {
        self.0
            .iter()
            .zip(region.perms.as_bytes())
            .all(|(&want, &have)| want == b'?' || want == have)
    }
}

impl Default for PermissionMask {
    fn default() -> Self {
        PermissionMask::DEFAULT
    }
}

impl FromStr for PermissionMask {
    type Err = FilterError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = text
            .as_bytes()
            .try_into()
            .map_err(|_| FilterError::MaskLength(text.to_string()))?;
        if !bytes.is_ascii() {
            return Err(FilterError::MaskLength(text.to_string()));
        }
        Ok(PermissionMask(bytes))
    }
}

impl fmt::Display for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

// ─── Address range ───

/// Half-open address bound `[from, to)`, always non-empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AddressRange {
    from: u64,
    to: u64,
}

impl AddressRange {
    /// The whole user address space.
    pub const FULL: AddressRange = AddressRange {
        from: 0,
        to: 0x7fff_ffff_ffff_ffff,
    };

    pub fn new(from: u64, to: u64) -> Result<AddressRange, FilterError> {
        if from < to {
            Ok(AddressRange { from, to })
        } else {
            Err(FilterError::RangeEmpty { from, to })
        }
    }

    pub fn from(&self) -> u64 {
        self.from
    }

    pub fn to(&self) -> u64 {
        self.to
    }

    /// Any overlap at all. Touching intervals do not overlap.
    pub fn overlaps(&self, region: &Region) -> bool {
        region.from < self.to && region.to > self.from
    }
}

impl Default for AddressRange {
    fn default() -> Self {
        AddressRange::FULL
    }
}

/// `FROM-TO` or `FROM..TO`, both hexadecimal without a prefix.
impl FromStr for AddressRange {
    type Err = FilterError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (from, to) = text
            .split_once("..")
            .or_else(|| text.split_once('-'))
            .ok_or_else(|| FilterError::RangeShape(text.to_string()))?;
        let parse = |part: &str| {
            u64::from_str_radix(part.trim(), 16)
                .map_err(|_| FilterError::RangeAddress(part.to_string()))
        };
        AddressRange::new(parse(from)?, parse(to)?)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}-{:x}", self.from, self.to)
    }
}

// ─── Filter ───

/// Both criteria together.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionFilter {
    pub mask: PermissionMask,
    pub range: AddressRange,
}

impl RegionFilter {
    pub fn new(mask: PermissionMask, range: AddressRange) -> Self {
        RegionFilter { mask, range }
    }

    pub fn accepts(&self, region: &Region) -> bool {
        self.mask.matches(region) && self.range.overlaps(region)
    }

    /// Accepted regions with their index in the full listing.
    pub fn select<'r>(
        &'r self,
        regions: &'r [Region],
    ) -> impl Iterator<Item = (usize, &'r Region)> + 'r {
        regions
            .iter()
            .enumerate()
            .filter(move |(_, region)| self.accepts(region))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
