//! IPv4 and IPv6 addresses and CIDR network blocks.
//!
//! ```
//! use netblock::NetworkBlock;
//!
//! let block: NetworkBlock = "192.168.0.0/24".parse().unwrap();
//! let excluded: Vec<NetworkBlock> = vec!["192.168.0.0/26".parse().unwrap()];
//! let left: Vec<String> = block
//!     .exclude(&excluded)
//!     .unwrap()
//!     .iter()
//!     .map(|b| b.to_string())
//!     .collect();
//! assert_eq!(vec!["192.168.0.64/26", "192.168.0.128/25"], left);
//! ```

mod address;
mod error;
mod format;
mod iter;
mod network;
mod parse;
mod uint;

pub use address::{Address, Version};
pub use error::{Error, Result};
pub use format::Format;
pub use iter::Addresses;
pub use network::{subnet_mask, NetworkBlock};
pub use uint::FixedUint;

/// Largest `times` accepted by [`NetworkBlock::split`].
pub const MAX_SPLIT_BITS: u8 = 20;
