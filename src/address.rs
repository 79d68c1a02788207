use crate::error::{check_versions, Error, Result};
use crate::format::{self, Format};
use crate::parse::{parse_ipv4, parse_ipv6};
use crate::uint::FixedUint;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// IP protocol version of an address or network block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V4,
    V6,
}

impl Version {
    /// Number of bits in an address of this version.
    pub fn width(self) -> u8 {
        match self {
            Version::V4 => 32,
            Version::V6 => 128,
        }
    }

    pub fn byte_len(self) -> usize {
        self.width() as usize / 8
    }

    pub fn number(self) -> u8 {
        match self {
            Version::V4 => 4,
            Version::V6 => 6,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "IPv{}", self.number())
    }
}

/// A single IPv4 or IPv6 address.
///
/// Addresses are immutable values: arithmetic and bitwise operations return a
/// new address of the same version. Arithmetic that would leave the address
/// space fails with [`Error::Overflow`] rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    version: Version,
    bits: FixedUint,
}

impl Address {
    pub fn from_u32(value: u32) -> Self {
        Address {
            version: Version::V4,
            bits: FixedUint::from(value),
        }
    }

    pub fn from_u128(value: u128) -> Self {
        Address {
            version: Version::V6,
            bits: FixedUint::from(value),
        }
    }

    /// IPv4 address from a plain integer, e.g. `257` is `0.0.1.1`.
    pub fn from_int(value: i64) -> Result<Self> {
        u32::try_from(value).map(Address::from_u32).map_err(|_| {
            Error::InvalidArgument(format!("{} is not a valid IPv4 address.", value))
        })
    }

    /// Network byte order; 4 bytes make an IPv4 address, 16 an IPv6 one.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let version = match bytes.len() {
            4 => Version::V4,
            16 => Version::V6,
            n => {
                return Err(Error::InvalidArgument(format!(
                    "Unable to guess IP address type from {} bytes.",
                    n
                )))
            }
        };
        let bits = FixedUint::from_be_bytes(bytes)
            .ok_or_else(|| Error::InvalidArgument("Unsupported byte length.".to_owned()))?;
        Ok(Address { version, bits })
    }

    pub(crate) fn from_bits(version: Version, bits: FixedUint) -> Self {
        debug_assert_eq!(version.width(), bits.width());
        Address { version, bits }
    }

    /// The all-zero address of `version`.
    pub fn zero(version: Version) -> Self {
        Address::from_bits(version, FixedUint::zero(version.width()))
    }

    /// The all-ones address of `version`.
    pub fn max(version: Version) -> Self {
        Address::from_bits(version, FixedUint::max(version.width()))
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn bits(&self) -> FixedUint {
        self.bits
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.to_be_bytes()
    }

    /// Adds a signed offset; negative offsets move towards zero.
    pub fn add(&self, offset: i128) -> Result<Address> {
        if offset >= 0 {
            self.add_unsigned(offset as u128)
        } else {
            self.subtract_unsigned(offset.unsigned_abs())
        }
    }

    /// Subtracts a signed offset; negative offsets move away from zero.
    pub fn subtract(&self, offset: i128) -> Result<Address> {
        if offset >= 0 {
            self.subtract_unsigned(offset as u128)
        } else {
            self.add_unsigned(offset.unsigned_abs())
        }
    }

    pub fn add_unsigned(&self, offset: u128) -> Result<Address> {
        self.bits
            .checked_add_u128(offset)
            .map(|bits| Address::from_bits(self.version, bits))
            .ok_or(Error::Overflow {
                version: self.version,
            })
    }

    pub fn subtract_unsigned(&self, offset: u128) -> Result<Address> {
        self.bits
            .checked_sub_u128(offset)
            .map(|bits| Address::from_bits(self.version, bits))
            .ok_or(Error::Overflow {
                version: self.version,
            })
    }

    pub fn bitwise_and(&self, other: &Address) -> Result<Address> {
        check_versions(self.version, other.version)?;
        Ok(Address::from_bits(self.version, self.bits & other.bits))
    }

    pub fn bitwise_or(&self, other: &Address) -> Result<Address> {
        check_versions(self.version, other.version)?;
        Ok(Address::from_bits(self.version, self.bits | other.bits))
    }

    pub fn bitwise_xor(&self, other: &Address) -> Result<Address> {
        check_versions(self.version, other.version)?;
        Ok(Address::from_bits(self.version, self.bits ^ other.bits))
    }

    pub fn bitwise_not(&self) -> Address {
        Address::from_bits(self.version, !self.bits)
    }

    pub fn compare_to(&self, other: &Address) -> Result<Ordering> {
        check_versions(self.version, other.version)?;
        Ok(self.bits.compare(&other.bits))
    }

    pub fn format(&self, mode: Format) -> Result<String> {
        format::render(self.version, self.bits.value(), mode)
    }

    /// Byte at `index`; negative indices count from the end (`-1` is the last byte).
    pub fn get_octet(&self, index: isize) -> Result<u8> {
        let len = self.version.byte_len();
        let pos = if index >= 0 {
            index
        } else {
            len as isize + index
        };
        if pos < 0 {
            return Err(Error::IndexOutOfRange { index, len });
        }
        self.bits
            .byte(pos as usize)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Whether this is an IPv6 address of the form `::ffff:a.b.c.d`.
    pub fn is_ipv4_mapped(&self) -> bool {
        self.version == Version::V6 && format::is_mapped(self.bits.value())
    }

    pub fn as_ipv4(&self) -> Result<Address> {
        match self.version {
            Version::V4 => Ok(*self),
            Version::V6 if self.is_ipv4_mapped() => {
                Ok(Address::from_u32(self.bits.value() as u32))
            }
            Version::V6 => Err(Error::InvalidConversion(self.to_string())),
        }
    }

    pub fn as_ipv6(&self) -> Address {
        match self.version {
            Version::V4 => Address::from_u128(format::mapped(self.bits.value() as u32)),
            Version::V6 => *self,
        }
    }
}

impl FromStr for Address {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        if s.contains(':') {
            parse_ipv6(s).map(Address::from_u128)
        } else {
            parse_ipv4(s).map(Address::from_u32)
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mode = match self.version {
            Version::V4 => Format::Compact,
            Version::V6 => Format::MayMappedCompact,
        };
        let text = self.format(mode).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<std::net::Ipv4Addr> for Address {
    fn from(ip: std::net::Ipv4Addr) -> Self {
        Address::from_u32(u32::from(ip))
    }
}

impl From<std::net::Ipv6Addr> for Address {
    fn from(ip: std::net::Ipv6Addr) -> Self {
        Address::from_u128(u128::from(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    fn ip(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn factory() {
        let cases = [
            ("127.0.0.1", "127.000.000.001", "127.0.0.1"),
            ("192.168.1.2", "192.168.001.002", "192.168.1.2"),
            ("10.0.0.2", "010.000.000.002", "10.0.0.2"),
            (
                "::1",
                "0000:0000:0000:0000:0000:0000:0000:0001",
                "::1",
            ),
            (
                "fe80::62fb:42ff:feeb:727c",
                "fe80:0000:0000:0000:62fb:42ff:feeb:727c",
                "fe80::62fb:42ff:feeb:727c",
            ),
            (
                "fc00:1234::e0",
                "fc00:1234:0000:0000:0000:0000:0000:00e0",
                "fc00:1234::e0",
            ),
        ];
        for (input, full, compact) in cases.iter() {
            let a = ip(input);
            assert_eq!(*full, a.format(Format::Full).unwrap());
            assert_eq!(*compact, a.format(Format::Compact).unwrap());
        }

        assert_eq!("0.0.1.1", Address::from_int(257).unwrap().to_string());
        assert_eq!(
            "000.000.001.001",
            Address::from_int(257).unwrap().format(Format::Full).unwrap()
        );
        assert_eq!("::101", Address::from_u128(257).to_string());
        assert!(Address::from_int(-12345).is_err());
        assert!(Address::from_int(1 << 40).is_err());
        assert_eq!(Version::V4, Address::from_bytes(&[1, 2, 3, 4]).unwrap().version());
        assert_eq!(Version::V6, Address::from_bytes(&[0; 16]).unwrap().version());
        assert!(Address::from_bytes(&[0; 5]).is_err());
        for bad in ["cake", "12345", "-12345", "256.0.0.1"] {
            assert_eq!(Err(Error::Parse(bad.to_owned())), bad.parse::<Address>());
        }
    }

    #[test]
    fn add_subtract() {
        let cases = [
            ("0.0.0.0", 0, "0.0.0.0"),
            ("0.0.0.0", 1, "0.0.0.1"),
            ("0.0.0.255", 1, "0.0.1.0"),
            ("0.0.255.0", 257, "0.1.0.1"),
            ("255.0.255.0", 257, "255.1.0.1"),
            ("192.168.0.0", 4, "192.168.0.4"),
            ("::1", 2, "::3"),
            ("::5", 6, "::b"),
            ("::10", 1, "::11"),
        ];
        for (left, offset, expected) in cases.iter() {
            let result = ip(left).add(*offset).unwrap();
            assert_eq!(Ok(Ordering::Equal), result.compare_to(&ip(expected)));
            assert_eq!(ip(left), result.subtract(*offset).unwrap());
        }
        assert_eq!(ip("0.0.0.1"), ip("0.0.0.3").add(-2).unwrap());
        assert_eq!(ip("0.0.0.5"), ip("0.0.0.3").subtract(-2).unwrap());
        assert_eq!(
            Err(Error::Overflow {
                version: Version::V4
            }),
            ip("255.255.255.255").add(1)
        );
        assert_eq!(
            Err(Error::Overflow {
                version: Version::V6
            }),
            ip("::").subtract(1)
        );
        assert_eq!(
            Address::max(Version::V6),
            ip("::").add_unsigned(u128::MAX).unwrap()
        );
    }

    #[test]
    fn bitwise() {
        //  op1, op2, and, or, xor, not
        let cases = [
            ("0.0.0.1", "0.0.0.1", "0.0.0.1", "0.0.0.1", "0.0.0.0", "255.255.255.254"),
            ("0.0.0.0", "0.0.0.1", "0.0.0.0", "0.0.0.1", "0.0.0.1", "255.255.255.255"),
            ("::1", "::1", "::1", "::1", "::", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:fffe"),
            ("::", "::1", "::", "::1", "::1", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"),
            ("::", "::", "::", "::", "::", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"),
        ];
        for (a, b, and, or, xor, not) in cases.iter() {
            let (a, b) = (ip(a), ip(b));
            assert_eq!(*and, a.bitwise_and(&b).unwrap().to_string());
            assert_eq!(*or, a.bitwise_or(&b).unwrap().to_string());
            assert_eq!(*xor, a.bitwise_xor(&b).unwrap().to_string());
            assert_eq!(*not, a.bitwise_not().to_string());
        }
        assert_eq!(
            Err(Error::TypeMismatch {
                left: Version::V4,
                right: Version::V6
            }),
            ip("0.0.0.1").bitwise_and(&ip("::1"))
        );
        assert!(ip("::1").compare_to(&ip("0.0.0.1")).is_err());
    }

    #[test]
    fn compare() {
        let cases = [
            ("127.0.0.1", "127.0.0.1", Ordering::Equal),
            ("127.0.0.0", "127.0.0.1", Ordering::Less),
            ("127.0.0.2", "127.0.0.1", Ordering::Greater),
            ("10.0.0.1", "127.0.0.2", Ordering::Less),
            ("::f", "::1", Ordering::Greater),
            ("::a", "::b", Ordering::Less),
        ];
        for (a, b, expected) in cases.iter() {
            assert_eq!(Ok(*expected), ip(a).compare_to(&ip(b)));
        }
    }

    #[test]
    fn octets() {
        let a = ip("10.250.30.40");
        assert_eq!(Ok(10), a.get_octet(-4));
        assert_eq!(Ok(40), a.get_octet(-1));
        assert_eq!(Ok(250), a.get_octet(1));
        assert_eq!(Ok(40), a.get_octet(3));
        assert_eq!(
            Err(Error::IndexOutOfRange { index: 4, len: 4 }),
            a.get_octet(4)
        );
        assert!(a.get_octet(-5).is_err());

        let b = ip("0001:0002:aaaa:1234:abcd:1000:2020:fffe");
        assert_eq!(Ok(0), b.get_octet(-16));
        assert_eq!(Ok(1), b.get_octet(-15));
        assert_eq!(Ok(0xAA), b.get_octet(-11));
        assert_eq!(Ok(0x12), b.get_octet(-10));
        assert_eq!(Ok(0xFF), b.get_octet(-2));
        assert_eq!(Ok(0x10), b.get_octet(10));
        assert_eq!(Ok(0xFE), b.get_octet(15));
        assert!(b.get_octet(16).is_err());
    }

    #[test]
    fn mapped() {
        let a = ip("::ffff:141.44.23.50");
        assert!(a.is_ipv4_mapped());
        assert_eq!("141.44.23.50", a.as_ipv4().unwrap().to_string());
        assert_eq!("::ffff:141.44.23.50", a.to_string());
        assert_eq!(
            "1:2:aaaa:1234:abcd:1000:2020:fffe",
            ip("1:2:aaaa:1234:abcd:1000:2020:fffe").to_string()
        );
        assert!(matches!(
            ip("::1").as_ipv4(),
            Err(Error::InvalidConversion(_))
        ));

        let cases = [
            ("0.0.0.0", "::ffff:0:0"),
            ("0.0.0.255", "::ffff:0:ff"),
            ("0.255.0.0", "::ffff:ff:0"),
            ("255.0.0.0", "::ffff:ff00:0"),
        ];
        for (v4, v6) in cases.iter() {
            assert_eq!(ip(v6), ip(v4).as_ipv6());
        }
    }

    #[quickcheck]
    fn round_trip_v4(x: u32, k: i64) -> TestResult {
        let a = Address::from_u32(x);
        match a.add(k as i128) {
            Ok(b) => TestResult::from_bool(b.subtract(k as i128) == Ok(a)),
            Err(_) => TestResult::discard(),
        }
    }

    #[quickcheck]
    fn round_trip_v6(x: u128, k: i128) -> TestResult {
        let a = Address::from_u128(x);
        match a.add(k) {
            Ok(b) => TestResult::from_bool(b.subtract(k) == Ok(a)),
            Err(_) => TestResult::discard(),
        }
    }

    #[quickcheck]
    fn text_round_trip(x: u128) -> bool {
        let a = Address::from_u128(x);
        [Format::Full, Format::Compact, Format::Abbreviated]
            .iter()
            .all(|m| a.format(*m).unwrap().parse::<Address>() == Ok(a))
    }
}
