//! Mapping listing records.
//!
//! One line per region:
//!
//! ```text
//! address           perms offset   dev   inode      path
//! 55b7c4a00000-55b7c4a28000 r--p 00000000 08:02 1234567    /usr/bin/example
//! 55b7c4c8c000-55b7c4c96000 rw-p 00000000 00:00 0          [heap]
//! ```
//!
//! Addresses, offset and device numbers are hexadecimal; the inode is
//! decimal. The path is optional and may contain spaces.

use std::fmt;

use crate::error::MapsError;

/// The 4-character permission field: read, write, execute, then `p`
/// (private) or `s` (shared). Absent permissions are `-`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Permissions([u8; 4]);

impl Permissions {
    /// Exactly four ASCII characters.
    pub fn parse(text: &str) -> Option<Permissions> {
        let bytes: [u8; 4] = text.as_bytes().try_into().ok()?;
        bytes.is_ascii().then_some(Permissions(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Construction guarantees ASCII.
        for &byte in &self.0 {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

/// One mapped region of the target process: the interval `[from, to)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub from: u64,
    pub to: u64,
    pub perms: Permissions,
    pub offset: u64,
    pub dev_major: u32,
    pub dev_minor: u32,
    pub inode: u64,
    pub path: Option<String>,
}

impl Region {
    /// Length in bytes. Never zero.
    pub fn len(&self) -> u64 {
        self.to - self.from
    }

    /// Parse one listing line. `None` when a field is missing or invalid,
    /// or when the interval is empty.
    pub fn parse_line(line: &str) -> Option<Region> {
        let mut rest = line;
        let (from, to) = next_field(&mut rest)?.split_once('-')?;
        let from = u64::from_str_radix(from, 16).ok()?;
        let to = u64::from_str_radix(to, 16).ok()?;
        if from >= to {
            return None;
        }
        let perms = Permissions::parse(next_field(&mut rest)?)?;
        let offset = u64::from_str_radix(next_field(&mut rest)?, 16).ok()?;
        let (major, minor) = next_field(&mut rest)?.split_once(':')?;
        let dev_major = u32::from_str_radix(major, 16).ok()?;
        let dev_minor = u32::from_str_radix(minor, 16).ok()?;
        let inode = next_field(&mut rest)?.parse().ok()?;
        let path = rest.trim();
        Some(Region {
            from,
            to,
            perms,
            offset,
            dev_major,
            dev_minor,
            inode,
            path: (!path.is_empty()).then(|| path.to_string()),
        })
    }
}

/// Split the next whitespace-delimited field off the front of `rest`.
fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start();
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (field, tail) = trimmed.split_at(end);
    *rest = tail;
    (!field.is_empty()).then_some(field)
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:016x}-{:016x} {} {:08x} {:02x}:{:02x} {}",
            self.from, self.to, self.perms, self.offset, self.dev_major, self.dev_minor, self.inode
        )?;
        if let Some(path) = &self.path {
            write!(f, " {path}")?;
        }
        Ok(())
    }
}

/// Parse a whole mapping listing. Blank lines are ignored.
pub fn parse_maps(listing: &str) -> Result<Vec<Region>, MapsError> {
    listing
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            Region::parse_line(line).ok_or_else(|| MapsError {
                line: index + 1,
                text: line.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
