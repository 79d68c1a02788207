use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IPV4: Regex = Regex::new(
        r"^(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$"
    )
    .expect("Not possible");
    static ref HEXTET: Regex = Regex::new(r"^[0-9a-fA-F]{1,4}$").expect("Not possible");
    static ref DIGITS: Regex = Regex::new(r"^[0-9]+$").expect("Not possible");
}

pub(crate) fn parse_ipv4(s: &str) -> Result<u32> {
    let caps = IPV4
        .captures(s)
        .ok_or_else(|| Error::Parse(s.to_owned()))?;
    let mut value = 0u32;
    for i in 1..=4 {
        let octet = caps
            .get(i)
            .map(|m| m.as_str().parse::<u8>())
            .ok_or_else(|| Error::Parse(s.to_owned()))?
            .map_err(|_| Error::Parse(s.to_owned()))?;
        value = (value << 8) | octet as u32;
    }
    Ok(value)
}

// Hextets of one side of a `::`, with an optional trailing dotted quad.
fn parse_groups(s: &str, full: &str, allow_ipv4: bool) -> Result<Vec<u16>> {
    let mut groups = Vec::new();
    if s.is_empty() {
        return Ok(groups);
    }
    let parts: Vec<&str> = s.split(':').collect();
    for (i, part) in parts.iter().enumerate() {
        if allow_ipv4 && i == parts.len() - 1 && part.contains('.') {
            let v4 = parse_ipv4(part).map_err(|_| Error::Parse(full.to_owned()))?;
            groups.push((v4 >> 16) as u16);
            groups.push(v4 as u16);
        } else if HEXTET.is_match(part) {
            let group =
                u16::from_str_radix(part, 16).map_err(|_| Error::Parse(full.to_owned()))?;
            groups.push(group);
        } else {
            return Err(Error::Parse(full.to_owned()));
        }
    }
    Ok(groups)
}

pub(crate) fn parse_ipv6(s: &str) -> Result<u128> {
    let halves: Vec<&str> = s.split("::").collect();
    let (head, tail) = match halves.as_slice() {
        [all] => (parse_groups(all, s, true)?, None),
        [head, tail] => (
            parse_groups(head, s, false)?,
            Some(parse_groups(tail, s, true)?),
        ),
        _ => return Err(Error::Parse(s.to_owned())),
    };

    let groups = match tail {
        None if head.len() == 8 => head,
        Some(tail) if head.len() + tail.len() <= 7 => {
            let mut groups = head;
            groups.resize(8 - tail.len(), 0);
            groups.extend(tail);
            groups
        }
        _ => return Err(Error::Parse(s.to_owned())),
    };
    Ok(groups
        .iter()
        .fold(0u128, |acc, &g| (acc << 16) | g as u128))
}

/// Parses a CIDR suffix such as the `24` of `10.0.0.0/24`.
pub(crate) fn parse_cidr(s: &str) -> Result<u8> {
    if !DIGITS.is_match(s) {
        return Err(Error::InvalidArgument(format!(
            "Malformed CIDR suffix '{}'.",
            s
        )));
    }
    s.parse::<u8>()
        .map_err(|_| Error::InvalidArgument(format!("Invalid CIDR '{}'. Out of range.", s)))
}
