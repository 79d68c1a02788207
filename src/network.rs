use crate::address::{Address, Version};
use crate::error::{check_versions, Error, Result};
use crate::iter::Addresses;
use crate::parse::parse_cidr;
use crate::uint::FixedUint;
use crate::MAX_SPLIT_BITS;
use primitive_types::U256;
use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Subnet mask of `version` with the `cidr` leading bits set.
pub fn subnet_mask(version: Version, cidr: u8) -> Result<Address> {
    check_cidr(version, cidr)?;
    Ok(Address::from_bits(
        version,
        FixedUint::mask(version.width(), cidr),
    ))
}

fn check_cidr(version: Version, cidr: u8) -> Result<()> {
    if cidr > version.width() {
        return Err(Error::InvalidArgument(format!(
            "Invalid CIDR '{}'. Out of range for {}.",
            cidr, version
        )));
    }
    Ok(())
}

/// An address together with a prefix length, e.g. `192.168.1.1/24`.
///
/// The base address is kept as given; it need not be the first address of the
/// block. [`NetworkBlock::network_identifier`] returns the canonical form.
///
/// Blocks order by base address, then prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetworkBlock {
    address: Address,
    cidr: u8,
}

impl NetworkBlock {
    pub fn new(address: Address, cidr: u8) -> Result<Self> {
        check_cidr(address.version(), cidr)?;
        Ok(NetworkBlock { address, cidr })
    }

    /// Single-address block (`/32` or `/128`).
    pub fn host(address: Address) -> Self {
        NetworkBlock {
            address,
            cidr: address.version().width(),
        }
    }

    /// Parses `addr` or `addr/cidr`. An explicit `cidr` wins over the text suffix.
    pub fn parse(text: &str, cidr: Option<u8>) -> Result<Self> {
        let (addr, suffix) = match text.split_once('/') {
            Some((addr, suffix)) => (addr, Some(suffix)),
            None => (text, None),
        };
        let address: Address = addr.parse()?;
        let cidr = match (cidr, suffix) {
            (Some(cidr), _) => cidr,
            (None, Some(suffix)) => parse_cidr(suffix)?,
            (None, None) => address.version().width(),
        };
        NetworkBlock::new(address, cidr)
    }

    /// The same base address under a different prefix length.
    pub fn with_cidr(&self, cidr: u8) -> Result<Self> {
        NetworkBlock::new(self.address, cidr)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn cidr(&self) -> u8 {
        self.cidr
    }

    pub fn version(&self) -> Version {
        self.address.version()
    }

    fn host_bits(&self) -> u8 {
        self.version().width() - self.cidr
    }

    fn mask(&self) -> FixedUint {
        FixedUint::mask(self.version().width(), self.cidr)
    }

    pub fn subnet_mask(&self) -> Address {
        Address::from_bits(self.version(), self.mask())
    }

    pub fn global_netmask(version: Version) -> Address {
        Address::max(version)
    }

    /// The block one bit less specific, or `None` for a `/0`.
    pub fn parent(&self) -> Option<NetworkBlock> {
        let cidr = self.cidr.checked_sub(1)?;
        let mask = FixedUint::mask(self.version().width(), cidr);
        Some(NetworkBlock {
            address: Address::from_bits(self.version(), self.address.bits() & mask),
            cidr,
        })
    }

    pub fn network_start(&self) -> Address {
        Address::from_bits(self.version(), self.address.bits() & self.mask())
    }

    pub fn network_end(&self) -> Address {
        Address::from_bits(self.version(), self.address.bits() | !self.mask())
    }

    pub fn is_network_identifier(&self) -> bool {
        self.address == self.network_start()
    }

    pub fn network_identifier(&self) -> NetworkBlock {
        NetworkBlock {
            address: self.network_start(),
            cidr: self.cidr,
        }
    }

    /// Number of addresses in the block, up to 2^128 for an IPv6 `/0`.
    pub fn count(&self) -> U256 {
        U256::one() << self.host_bits() as usize
    }

    /// The address `offset` steps into the block.
    ///
    /// Counts from the start for non-negative offsets and from the end for
    /// negative ones unless `from_start` says otherwise; counting from the end
    /// always moves backwards, so `(0, Some(false))` is the last address.
    pub fn address_in_network(&self, offset: i128, from_start: Option<bool>) -> Result<Address> {
        let positive = offset >= 0;
        let from_start = from_start.unwrap_or(positive);
        let magnitude = offset.unsigned_abs();
        let point = if from_start {
            self.network_start()
        } else {
            self.network_end()
        };
        let outside = || {
            Error::InvalidArgument(format!("Offset {} is outside of network {}.", offset, self))
        };
        let address = if positive && from_start {
            point.add_unsigned(magnitude)
        } else {
            point.subtract_unsigned(magnitude)
        }
        .map_err(|_| outside())?;
        if !self.encloses_address(&address)? {
            return Err(outside());
        }
        Ok(address)
    }

    /// Whether the two blocks have any address in common.
    pub fn shares_subnet_space(&self, other: &NetworkBlock) -> Result<bool> {
        check_versions(self.version(), other.version())?;
        let (first, second) = if self.cidr > other.cidr {
            (other, self)
        } else {
            (self, other)
        };
        Ok(first.network_start() <= second.network_start()
            && first.network_end() >= second.network_end())
    }

    pub fn encloses_subnet(&self, other: &NetworkBlock) -> Result<bool> {
        check_versions(self.version(), other.version())?;
        if self.cidr > other.cidr {
            return Ok(false);
        }
        self.shares_subnet_space(other)
    }

    pub fn encloses_address(&self, address: &Address) -> Result<bool> {
        check_versions(self.version(), address.version())?;
        Ok(self.network_start() <= *address && self.network_end() >= *address)
    }

    pub fn is_same_version(&self, address: &Address) -> bool {
        self.version() == address.version()
    }

    pub fn compare_to(&self, other: &NetworkBlock) -> Result<Ordering> {
        Ok(self
            .address
            .compare_to(&other.address)?
            .then(self.cidr.cmp(&other.cidr)))
    }

    /// Size of an IPv4 block in classful units, e.g. `"1/4 C"`, `"2 B"`.
    pub fn network_class(&self) -> Option<String> {
        if self.version() != Version::V4 {
            return None;
        }
        let cidr = self.cidr as u32;
        Some(match cidr {
            25..=32 => format!("1/{} C", 1u32 << (cidr - 24)),
            17..=24 => format!("{} C", 1u32 << (24 - cidr)),
            9..=16 => format!("{} B", 1u32 << (16 - cidr)),
            _ => format!("{} A", 1u32 << (8 - cidr)),
        })
    }

    /// Splits the block into `2^times` blocks, `times` bits more specific,
    /// in ascending order from the network start.
    pub fn split(&self, times: u8) -> Result<Vec<NetworkBlock>> {
        if times == 0 {
            return Ok(vec![*self]);
        }
        let width = self.version().width();
        let cidr = self
            .cidr
            .checked_add(times)
            .filter(|cidr| *cidr <= width)
            .ok_or_else(|| {
                Error::InvalidArgument("Cannot split beyond smallest subnet size".to_owned())
            })?;
        if times > MAX_SPLIT_BITS {
            return Err(Error::InvalidArgument(format!(
                "Cannot split into more than 2^{} blocks",
                MAX_SPLIT_BITS
            )));
        }

        let step = 1u128 << (width - cidr);
        let start = self.network_start();
        let mut out = Vec::with_capacity(1usize << times);
        for i in 0..(1u128 << times) {
            out.push(NetworkBlock {
                address: start.add_unsigned(i * step)?,
                cidr,
            });
        }
        log::trace!("split {} into {} blocks of /{}", self, out.len(), cidr);
        Ok(out)
    }

    /// The parts of this block not covered by any of `excluded`.
    ///
    /// Blocks come out in the order the splitting produces them, not sorted.
    pub fn exclude(&self, excluded: &[NetworkBlock]) -> Result<Vec<NetworkBlock>> {
        for block in excluded {
            check_versions(self.version(), block.version())?;
        }

        let mut candidates = vec![*self];
        for exclude in excluded {
            let mut stack: VecDeque<NetworkBlock> = std::mem::take(&mut candidates).into();
            while let Some(candidate) = stack.pop_front() {
                if !candidate.shares_subnet_space(exclude)? {
                    candidates.push(candidate);
                } else if candidate.cidr < exclude.cidr {
                    for half in candidate.split(1)?.into_iter().rev() {
                        stack.push_front(half);
                    }
                }
            }
            if candidates.is_empty() {
                break;
            }
        }
        log::debug!(
            "excluding {} blocks from {} left {}",
            excluded.len(),
            self,
            candidates.len()
        );
        Ok(candidates)
    }

    /// Aggregates blocks of any version and size into the fewest CIDR blocks
    /// covering the same addresses.
    ///
    /// Sibling blocks are merged into their parent, most specific first.
    /// Output is in emission order: per version in order of first appearance,
    /// most specific blocks first.
    pub fn merge(blocks: &[NetworkBlock]) -> Vec<NetworkBlock> {
        let mut versions: Vec<Version> = Vec::new();
        let mut buckets: BTreeMap<(Version, u8), Vec<NetworkBlock>> = BTreeMap::new();
        for block in blocks {
            let block = block.network_identifier();
            if !versions.contains(&block.version()) {
                versions.push(block.version());
            }
            buckets
                .entry((block.version(), block.cidr))
                .or_default()
                .push(block);
        }

        let mut out = Vec::new();
        for version in versions {
            let first = out.len();
            for cidr in (0..=version.width()).rev() {
                let mut bucket = match buckets.remove(&(version, cidr)) {
                    Some(bucket) => bucket,
                    None => continue,
                };
                if bucket.len() == 1 {
                    out.append(&mut bucket);
                    continue;
                }

                bucket.sort();
                bucket.dedup();
                let mut i = 0;
                while i < bucket.len() {
                    let block = bucket[i];
                    match (block.parent(), bucket.get(i + 1)) {
                        (Some(parent), Some(next)) if next.parent() == Some(parent) => {
                            buckets
                                .entry((version, parent.cidr))
                                .or_default()
                                .push(parent);
                            i += 2;
                        }
                        _ => {
                            out.push(block);
                            i += 1;
                        }
                    }
                }
            }

            // Blocks swallowed by a larger emitted block.
            let merged = out.split_off(first);
            out.extend(merged.iter().copied().filter(|block| {
                !merged
                    .iter()
                    .any(|other| other.cidr < block.cidr && matches!(other.encloses_subnet(block), Ok(true)))
            }));
        }
        log::debug!("merged {} blocks into {}", blocks.len(), out.len());
        out
    }

    /// Finds a block of prefix `cidr` among `blocks`.
    ///
    /// Returns an exact match paired with itself, or else the first `/cidr`
    /// inside the most specific block that is larger than `/cidr`, paired with
    /// that enclosing block.
    pub fn block_in_smallest(
        blocks: &[NetworkBlock],
        cidr: u8,
    ) -> Result<(NetworkBlock, NetworkBlock)> {
        let mut smallest: Option<&NetworkBlock> = None;
        for block in blocks {
            if block.cidr == cidr {
                return Ok((*block, *block));
            }
            if block.cidr < cidr && smallest.map_or(true, |s| block.cidr > s.cidr) {
                smallest = Some(block);
            }
        }
        let smallest =
            smallest.ok_or_else(|| Error::InvalidArgument(format!("No block of /{} found", cidr)))?;
        Ok((
            NetworkBlock::new(smallest.network_start(), cidr)?,
            *smallest,
        ))
    }

    /// Every address of the block, from the network start to the network end.
    pub fn addresses(&self) -> Addresses {
        Addresses::new(self)
    }
}

impl<'a> IntoIterator for &'a NetworkBlock {
    type Item = Address;
    type IntoIter = Addresses;
    fn into_iter(self) -> Addresses {
        self.addresses()
    }
}

impl FromStr for NetworkBlock {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        NetworkBlock::parse(s, None)
    }
}

impl Display for NetworkBlock {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.cidr)
    }
}
