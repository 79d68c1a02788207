//! Unsigned integers of a fixed bit width (32 for IPv4, 128 for IPv6).
//!
//! Values are stored in a `u128` and always fit in `width` bits. Arithmetic is
//! checked: leaving `[0, 2^width - 1]` yields `None` instead of wrapping.
//! Binary operations between different widths are programming errors and panic.

use std::cmp::Ordering;
use std::ops::{BitAnd, BitOr, BitXor, Not};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FixedUint {
    value: u128,
    width: u8,
}

fn max_value(width: u8) -> u128 {
    u128::MAX.checked_shr(128 - width as u32).unwrap_or(0)
}

impl FixedUint {
    pub fn new(value: u128, width: u8) -> Option<Self> {
        if width == 0 || width > 128 || value > max_value(width) {
            return None;
        }
        Some(FixedUint { value, width })
    }

    pub fn zero(width: u8) -> Self {
        assert!(width > 0 && width <= 128, "unsupported width {}", width);
        FixedUint { value: 0, width }
    }

    pub fn max(width: u8) -> Self {
        assert!(width > 0 && width <= 128, "unsupported width {}", width);
        FixedUint {
            value: max_value(width),
            width,
        }
    }

    /// The value with the `prefix` most significant bits set and the rest clear.
    pub fn mask(width: u8, prefix: u8) -> Self {
        assert!(prefix <= width, "prefix {} wider than {}", prefix, width);
        let all = Self::max(width).value;
        let host = all.checked_shr(prefix as u32).unwrap_or(0);
        FixedUint {
            value: all & !host,
            width,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn value(&self) -> u128 {
        self.value
    }

    pub fn byte_len(&self) -> usize {
        self.width as usize / 8
    }

    pub fn checked_add(self, rhs: FixedUint) -> Option<Self> {
        self.check_width(&rhs);
        self.checked_add_u128(rhs.value)
    }

    pub fn checked_sub(self, rhs: FixedUint) -> Option<Self> {
        self.check_width(&rhs);
        self.checked_sub_u128(rhs.value)
    }

    pub fn checked_add_u128(self, rhs: u128) -> Option<Self> {
        self.value
            .checked_add(rhs)
            .and_then(|v| FixedUint::new(v, self.width))
    }

    pub fn checked_sub_u128(self, rhs: u128) -> Option<Self> {
        self.value
            .checked_sub(rhs)
            .and_then(|v| FixedUint::new(v, self.width))
    }

    /// Byte at `index`, 0 being the most significant.
    pub fn byte(&self, index: usize) -> Option<u8> {
        let len = self.byte_len();
        if index >= len {
            return None;
        }
        Some((self.value >> (8 * (len - 1 - index))) as u8)
    }

    pub fn to_be_bytes(&self) -> Vec<u8> {
        let bytes = self.value.to_be_bytes();
        bytes[16 - self.byte_len()..].to_vec()
    }

    /// Big-endian bytes; the width is eight times the slice length.
    pub fn from_be_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > 16 {
            return None;
        }
        let value = bytes.iter().fold(0u128, |acc, &b| (acc << 8) | b as u128);
        FixedUint::new(value, (bytes.len() * 8) as u8)
    }

    pub fn compare(&self, other: &FixedUint) -> Ordering {
        self.check_width(other);
        self.value.cmp(&other.value)
    }

    pub fn leading_zeros(&self) -> u32 {
        self.value.leading_zeros() - (128 - self.width as u32)
    }

    pub fn trailing_zeros(&self) -> u32 {
        self.value.trailing_zeros().min(self.width as u32)
    }

    fn check_width(&self, other: &FixedUint) {
        assert_eq!(
            self.width, other.width,
            "fixed width integers of different widths"
        );
    }
}

impl PartialOrd for FixedUint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Total across widths so values can key ordered collections; same-width
// values order numerically.
impl Ord for FixedUint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.width
            .cmp(&other.width)
            .then(self.value.cmp(&other.value))
    }
}

impl From<u32> for FixedUint {
    fn from(value: u32) -> Self {
        FixedUint {
            value: value as u128,
            width: 32,
        }
    }
}

impl From<u128> for FixedUint {
    fn from(value: u128) -> Self {
        FixedUint { value, width: 128 }
    }
}

impl BitAnd for FixedUint {
    type Output = FixedUint;
    fn bitand(self, rhs: FixedUint) -> FixedUint {
        self.check_width(&rhs);
        FixedUint {
            value: self.value & rhs.value,
            width: self.width,
        }
    }
}

impl BitOr for FixedUint {
    type Output = FixedUint;
    fn bitor(self, rhs: FixedUint) -> FixedUint {
        self.check_width(&rhs);
        FixedUint {
            value: self.value | rhs.value,
            width: self.width,
        }
    }
}

impl BitXor for FixedUint {
    type Output = FixedUint;
    fn bitxor(self, rhs: FixedUint) -> FixedUint {
        self.check_width(&rhs);
        FixedUint {
            value: self.value ^ rhs.value,
            width: self.width,
        }
    }
}

impl Not for FixedUint {
    type Output = FixedUint;
    fn not(self) -> FixedUint {
        FixedUint {
            value: !self.value & max_value(self.width),
            width: self.width,
        }
    }
}
