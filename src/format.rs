//! Textual renderings of addresses.
//!
//! IPv4 supports [`Format::Full`], [`Format::Compact`] and [`Format::Integer`];
//! IPv6 supports every mode except [`Format::Integer`].

use crate::address::Version;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Every group zero padded: `010.000.000.001`, `2001:0630:00d0:0000:...`.
    Full,
    /// Shortest canonical form: `10.0.0.1`, `2001:630:d0::`.
    Compact,
    /// IPv6 groups without leading zeros and without `::` compression.
    Abbreviated,
    /// `::ffff:a.b.c.d` for IPv4-mapped IPv6 addresses, compact otherwise.
    MappedIpv4,
    /// Same rendering as [`Format::MappedIpv4`]; the default for IPv6.
    MayMappedCompact,
    /// IPv4 as a decimal integer.
    Integer,
}

const MAPPED_PREFIX: u128 = 0xFFFF << 32;
const MAPPED_MASK: u128 = !0xFFFF_FFFF;

pub(crate) fn is_mapped(value: u128) -> bool {
    value & MAPPED_MASK == MAPPED_PREFIX
}

pub(crate) fn mapped(v4: u32) -> u128 {
    MAPPED_PREFIX | v4 as u128
}

pub(crate) fn render(version: Version, value: u128, mode: Format) -> Result<String> {
    match (version, mode) {
        (Version::V4, Format::Full) => Ok(dotted(value as u32, true)),
        (Version::V4, Format::Compact) => Ok(dotted(value as u32, false)),
        (Version::V4, Format::Integer) => Ok(value.to_string()),
        (Version::V6, Format::Full) => Ok(hextets(value)
            .iter()
            .map(|g| format!("{:04x}", g))
            .collect::<Vec<_>>()
            .join(":")),
        (Version::V6, Format::Abbreviated) => Ok(hextets(value)
            .iter()
            .map(|g| format!("{:x}", g))
            .collect::<Vec<_>>()
            .join(":")),
        (Version::V6, Format::Compact) => Ok(compact(value)),
        (Version::V6, Format::MappedIpv4) | (Version::V6, Format::MayMappedCompact) => {
            if is_mapped(value) {
                Ok(format!("::ffff:{}", dotted(value as u32, false)))
            } else {
                Ok(compact(value))
            }
        }
        (version, mode) => Err(Error::InvalidFormat { mode, version }),
    }
}

fn dotted(v: u32, padded: bool) -> String {
    let octets = v.to_be_bytes();
    if padded {
        format!(
            "{:03}.{:03}.{:03}.{:03}",
            octets[0], octets[1], octets[2], octets[3]
        )
    } else {
        format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
    }
}

fn hextets(value: u128) -> [u16; 8] {
    let mut groups = [0u16; 8];
    for (i, g) in groups.iter_mut().enumerate() {
        *g = (value >> (16 * (7 - i))) as u16;
    }
    groups
}

// Leftmost longest run of at least two zero groups, as (start, len).
fn longest_zero_run(groups: &[u16; 8]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;
    while i < groups.len() {
        if groups[i] != 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < groups.len() && groups[i] == 0 {
            i += 1;
        }
        let len = i - start;
        if len >= 2 && best.map_or(true, |(_, l)| len > l) {
            best = Some((start, len));
        }
    }
    best
}

fn compact(value: u128) -> String {
    let groups = hextets(value);
    let join = |gs: &[u16]| {
        gs.iter()
            .map(|g| format!("{:x}", g))
            .collect::<Vec<_>>()
            .join(":")
    };
    match longest_zero_run(&groups) {
        Some((start, len)) => format!(
            "{}::{}",
            join(&groups[..start]),
            join(&groups[start + len..])
        ),
        None => join(&groups),
    }
}
