use crate::address::Version;
use crate::format::Format;
use thiserror::Error;

/// Errors produced by address and network block operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid IP address or network '{0}'.")]
    Parse(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Incompatible types ('{left}' and '{right}').")]
    TypeMismatch { left: Version, right: Version },

    #[error("The specified octet ({index}) is out of range for a {len} byte address.")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Not an IPv4 address encoded in an IPv6 address: {0}")]
    InvalidConversion(String),

    #[error("Unsupported format mode {mode:?} for {version} addresses.")]
    InvalidFormat { mode: Format, version: Version },

    #[error("{version} address arithmetic out of range.")]
    Overflow { version: Version },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::TypeMismatch`] unless both versions agree.
pub(crate) fn check_versions(left: Version, right: Version) -> Result<()> {
    if left != right {
        return Err(Error::TypeMismatch { left, right });
    }
    Ok(())
}
