use crate::address::Address;
use crate::network::NetworkBlock;
use std::iter::FusedIterator;

/// Ascending iterator over the addresses of a [`NetworkBlock`].
///
/// Each call to [`NetworkBlock::addresses`] starts a fresh cursor, so nested
/// loops over the same block are independent.
#[derive(Debug, Clone)]
pub struct Addresses {
    next: Option<Address>,
    end: Address,
}

impl Addresses {
    pub(crate) fn new(block: &NetworkBlock) -> Self {
        Addresses {
            next: Some(block.network_start()),
            end: block.network_end(),
        }
    }
}

impl Iterator for Addresses {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        let current = self.next?;
        self.next = if current == self.end {
            None
        } else {
            current.add_unsigned(1).ok()
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let next = match self.next {
            Some(next) => next,
            None => return (0, Some(0)),
        };
        let remaining = self.end.bits().value() - next.bits().value();
        match usize::try_from(remaining)
            .ok()
            .and_then(|r| r.checked_add(1))
        {
            Some(r) => (r, Some(r)),
            None => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Addresses {}

#[cfg(test)]
mod tests {
    use crate::network::NetworkBlock;

    #[test]
    fn bounds() {
        let block: NetworkBlock = "10.0.0.5/29".parse().unwrap();
        let mut it = block.addresses();
        assert_eq!((8, Some(8)), it.size_hint());
        assert_eq!(Some("10.0.0.0".parse().unwrap()), it.next());
        assert_eq!(7, it.by_ref().count());
        assert_eq!(None, it.next());
        assert_eq!((0, Some(0)), it.size_hint());

        let top: NetworkBlock = "ffff:ffff:ffff:ffff:ffff:ffff:ffff:fffe/127".parse().unwrap();
        assert_eq!(2, top.addresses().count());

        let all: NetworkBlock = "::/0".parse().unwrap();
        assert_eq!((usize::MAX, None), all.addresses().size_hint());
        assert_eq!(
            Some("::2".parse().unwrap()),
            all.addresses().nth(2)
        );
    }
}
