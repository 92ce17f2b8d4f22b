//! Strict validation of IPv4 and IPv6 address literals
//!
//! [`AddressLiteral`] keeps the exact text that validated. Nothing is
//! normalized: `2001:DB8::1` stays upper case and `::1` stays compressed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Number of 16-bit groups in a fully expanded IPv6 address
const IPV6_GROUPS: usize = 8;

/// A validated IPv4 or IPv6 address literal.
///
/// The only way to build one is through [`AddressLiteral::parse`] (or
/// `str::parse`), so the tag always matches the text it carries.
///
/// # Examples
///
/// ```
/// use tracelens::AddressLiteral;
///
/// let addr = AddressLiteral::parse(" 2001:db8::1 ").unwrap();
/// assert!(addr.is_ipv6());
/// assert_eq!(addr.as_str(), "2001:db8::1");
///
/// assert!(AddressLiteral::parse("192.168.1.256").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AddressLiteral {
    /// Dotted-quad IPv4 text
    Ipv4(String),
    /// Colon-separated IPv6 text, possibly `::`-compressed
    Ipv6(String),
}

/// Error returned when text is not a valid address literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address literal: {0:?}")]
pub struct InvalidAddress(pub String);

impl AddressLiteral {
    /// Validate `text` as an address literal.
    ///
    /// Surrounding whitespace is trimmed first. Text containing a colon is
    /// only ever considered as IPv6.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();

        if trimmed.contains(':') {
            return is_valid_ipv6(trimmed).then(|| Self::Ipv6(trimmed.to_string()));
        }

        is_valid_ipv4(trimmed).then(|| Self::Ipv4(trimmed.to_string()))
    }

    /// The validated text, exactly as it was given (minus outer whitespace)
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ipv4(text) | Self::Ipv6(text) => text,
        }
    }

    /// Returns true for the IPv4 variant
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Self::Ipv4(_))
    }

    /// Returns true for the IPv6 variant
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Self::Ipv6(_))
    }

    /// Convert to a std address, if the standard parser agrees
    pub fn to_ip_addr(&self) -> Option<IpAddr> {
        self.as_str().parse().ok()
    }
}

impl fmt::Display for AddressLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressLiteral {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidAddress(s.to_string()))
    }
}

impl TryFrom<String> for AddressLiteral {
    type Error = InvalidAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AddressLiteral> for String {
    fn from(addr: AddressLiteral) -> Self {
        match addr {
            AddressLiteral::Ipv4(text) | AddressLiteral::Ipv6(text) => text,
        }
    }
}

/// Four decimal octets in 0..=255, no signs, no leading zeros
fn is_valid_ipv4(text: &str) -> bool {
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 4 {
        return false;
    }

    parts.iter().all(|part| {
        !part.is_empty()
            && part.bytes().all(|b| b.is_ascii_digit())
            && (part.len() == 1 || !part.starts_with('0'))
            && part.parse::<u8>().is_ok()
    })
}

fn is_valid_ipv6(text: &str) -> bool {
    let groups: Vec<&str> = if text.contains("::") {
        let halves: Vec<&str> = text.split("::").collect();
        if halves.len() != 2 {
            return false;
        }

        let left = split_groups(halves[0]);
        let right = split_groups(halves[1]);
        let Some(missing) = IPV6_GROUPS.checked_sub(left.len() + right.len()) else {
            return false;
        };

        left.into_iter()
            .chain(std::iter::repeat("0").take(missing))
            .chain(right)
            .collect()
    } else {
        text.split(':').collect()
    };

    groups.len() == IPV6_GROUPS && groups.iter().all(|g| is_hextet(g))
}

/// Colon-separated groups of one side of a `::`; an empty side has none
fn split_groups(side: &str) -> Vec<&str> {
    if side.is_empty() {
        Vec::new()
    } else {
        side.split(':').collect()
    }
}

fn is_hextet(group: &str) -> bool {
    (1..=4).contains(&group.len()) && group.bytes().all(|b| b.is_ascii_hexdigit())
}
