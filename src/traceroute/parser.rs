//! Parser for the text output of the system `traceroute` command
//!
//! Hop lines look like:
//!
//! ```text
//!  1  router.local (192.168.1.1)  1.512 ms  1.204 ms  1.188 ms
//!  2  * 10.0.0.1 (10.0.0.1)  9.120 ms *
//!  3  * * *
//! ```
//!
//! Lines that don't start with a hop number are dropped without error.

use crate::address::AddressLiteral;
use crate::traceroute::types::Hop;
use tracing::{debug, trace};

/// Prefix of the banner line printed by `traceroute` and `traceroute6`
const BANNER_PREFIX: &str = "traceroute";

/// Parse the full captured output of a traceroute run.
///
/// Hops come back in the order they appear in the text.
///
/// # Examples
///
/// ```
/// let output = "traceroute to 8.8.8.8 (8.8.8.8), 30 hops max\n\
///               1  router.local (192.168.1.1)  1.5 ms  2.0 ms\n\
///               2  * * *\n";
///
/// let hops = tracelens::traceroute::parser::parse_output(output);
/// assert_eq!(hops.len(), 2);
/// assert_eq!(hops[0].hostname.as_deref(), Some("router.local"));
/// assert!(hops[1].is_timeout);
/// ```
pub fn parse_output(output: &str) -> Vec<Hop> {
    output.lines().filter_map(parse_line).collect()
}

/// Parse one line of output, skipping blank and banner lines
pub fn parse_line(line: &str) -> Option<Hop> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(BANNER_PREFIX) {
        return None;
    }
    parse_hop_line(trimmed)
}

/// Parse a single hop line.
///
/// Returns `None` when the first token is not a positive hop number.
pub fn parse_hop_line(line: &str) -> Option<Hop> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (first, rest) = tokens.split_first()?;

    let hop_number = match first.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            trace!(line, "Dropping line without a hop number");
            return None;
        }
    };

    if rest.iter().all(|token| *token == "*") {
        return Some(Hop::timeout(hop_number));
    }

    let mut address: Option<String> = None;
    let mut hostname: Option<String> = None;
    let mut rtts = Vec::new();

    let mut i = 0;
    while i < rest.len() {
        let token = rest[i];

        if token == "*" {
            i += 1;
            continue;
        }

        if let Some(inner) = parenthesized(token) {
            if address.is_none() {
                address = Some(inner.to_string());
            }
            i += 1;
            continue;
        }

        if rest.get(i + 1) == Some(&"ms") {
            match token.parse::<f64>() {
                Ok(rtt) => rtts.push(rtt),
                Err(_) => debug!(token, hop_number, "Ignoring malformed RTT sample"),
            }
            i += 2;
            continue;
        }

        // Dotted tokens are address candidates until an address is known;
        // other tokens only fill an empty hostname.
        let dotted = token.contains('.');
        if (hostname.is_none() && !dotted) || (dotted && address.is_none()) {
            if AddressLiteral::parse(token).is_some() {
                if address.is_none() {
                    address = Some(token.to_string());
                }
            } else if hostname.is_none() {
                hostname = Some(token.to_string());
            }
        }

        i += 1;
    }

    Some(Hop::new(hop_number, address, hostname, rtts))
}

fn parenthesized(token: &str) -> Option<&str> {
    token.strip_prefix('(')?.strip_suffix(')')
}
