//! Parser for firewall connection notifications
//!
//! Messages look like:
//!
//! ```text
//! tried to establish an incoming connection to Brave Browser via Brave Browser Helper on UDP port 5353 (mdns).
//! ```
//!
//! Every field is extracted independently and falls back to a default when
//! its marker is missing, so parsing never fails.

use crate::address::AddressLiteral;
use crate::connection::service::KnownService;
use crate::connection::types::{
    ConnectionDirection, ConnectionRecord, NetworkProtocol, UNKNOWN_APPLICATION,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::SystemTime;
use tracing::debug;

static PORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)port\s+(\d+)(?:\s*\(([^)]+)\))?").expect("port pattern is valid")
});

static IPV6_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9A-Fa-f]*:[0-9A-Fa-f:]+").expect("IPv6 pattern is valid"));

static IPV4_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\b").expect("IPv4 pattern is valid")
});

/// Parser for firewall connection messages
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionMessageParser;

impl ConnectionMessageParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse one message into a [`ConnectionRecord`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tracelens::{ConnectionDirection, ConnectionMessageParser, KnownService};
    ///
    /// let record = ConnectionMessageParser::new()
    ///     .parse("tried to establish an outgoing connection to curl on TCP port 443");
    /// assert_eq!(record.direction, ConnectionDirection::Outgoing);
    /// assert_eq!(record.application, "curl");
    /// assert_eq!(record.service, Some(KnownService::Https));
    /// ```
    pub fn parse(&self, message: &str) -> ConnectionRecord {
        let trimmed = message.trim();

        let application = extract_application(trimmed).unwrap_or_else(|| {
            debug!("No application name found, using default");
            UNKNOWN_APPLICATION.to_string()
        });

        let (port, service_hint) = extract_port(trimmed);
        let service = match (&service_hint, port) {
            (Some(name), _) => KnownService::from_name(name),
            (None, Some(port)) => KnownService::from_port(port),
            (None, None) => None,
        };

        ConnectionRecord {
            direction: extract_direction(trimmed),
            application,
            process: extract_process(trimmed),
            remote_address: extract_address(trimmed),
            remote_port: port,
            local_port: None,
            protocol: extract_protocol(trimmed),
            service,
            raw_message: message.to_string(),
            timestamp: SystemTime::now(),
        }
    }

    /// Validate `text` as an address literal
    pub fn parse_address(&self, text: &str) -> Option<AddressLiteral> {
        AddressLiteral::parse(text)
    }
}

/// Byte offset of the first ASCII case-insensitive match of `needle`
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

fn extract_direction(message: &str) -> ConnectionDirection {
    if message.contains("incoming connection") {
        ConnectionDirection::Incoming
    } else {
        // "outgoing connection", "connect to" and anything else
        ConnectionDirection::Outgoing
    }
}

/// Text after "connection to ", up to " via " or else " on "
fn extract_application(message: &str) -> Option<String> {
    const MARKER: &str = "connection to ";

    let start = find_ignore_case(message, MARKER)? + MARKER.len();
    let rest = &message[start..];

    let end = find_ignore_case(rest, " via ").or_else(|| find_ignore_case(rest, " on "))?;
    let application = rest[..end].trim();

    (!application.is_empty()).then(|| application.to_string())
}

/// Text after " via ", up to " on " or the end of the message
fn extract_process(message: &str) -> Option<String> {
    const MARKER: &str = " via ";

    let start = find_ignore_case(message, MARKER)? + MARKER.len();
    let rest = &message[start..];
    let end = find_ignore_case(rest, " on ").unwrap_or(rest.len());
    let process = rest[..end].trim();

    (!process.is_empty()).then(|| process.to_string())
}

fn extract_protocol(message: &str) -> NetworkProtocol {
    if find_ignore_case(message, "udp").is_some() {
        NetworkProtocol::Udp
    } else if find_ignore_case(message, "tcp").is_some() {
        NetworkProtocol::Tcp
    } else if find_ignore_case(message, "icmp").is_some() {
        NetworkProtocol::Icmp
    } else {
        NetworkProtocol::Unknown
    }
}

/// First "port N" occurrence and its optional "(service)" hint
fn extract_port(message: &str) -> (Option<u32>, Option<String>) {
    let Some(captures) = PORT_PATTERN.captures(message) else {
        return (None, None);
    };

    let port = captures.get(1).and_then(|m| {
        let port: Option<u32> = m.as_str().parse().ok();
        if port.is_none() {
            debug!(value = m.as_str(), "Port number too long");
        }
        port
    });
    let hint = captures.get(2).map(|m| m.as_str().to_string());

    (port, hint)
}

/// First validated IPv6 literal, else the first dotted quad.
///
/// Dotted quads are returned as matched, without octet range checks.
fn extract_address(message: &str) -> Option<String> {
    let ipv6 = IPV6_CANDIDATE
        .find_iter(message)
        .filter(|m| is_standalone(message, m.start(), m.end()))
        .find_map(|m| AddressLiteral::parse(m.as_str()).filter(AddressLiteral::is_ipv6));

    if let Some(addr) = ipv6 {
        return Some(addr.into());
    }

    IPV4_PATTERN
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// The match is not glued to surrounding word characters
fn is_standalone(message: &str, start: usize, end: usize) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let before = message[..start].chars().next_back();
    let after = message[end..].chars().next();

    !before.is_some_and(is_word) && !after.is_some_and(is_word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(message: &str) -> ConnectionRecord {
        ConnectionMessageParser::new().parse(message)
    }

    #[test]
    fn test_incoming_message() {
        let record = parse(
            "tried to establish an incoming connection to Brave Browser via Brave Browser Helper on UDP port 5353 (mdns).",
        );

        assert_eq!(record.direction, ConnectionDirection::Incoming);
        assert_eq!(record.application, "Brave Browser");
        assert_eq!(record.process.as_deref(), Some("Brave Browser Helper"));
        assert_eq!(record.protocol, NetworkProtocol::Udp);
        assert_eq!(record.remote_port, Some(5353));
        assert_eq!(record.service, Some(KnownService::Mdns));
        assert_eq!(record.remote_address, None);
        assert_eq!(record.local_port, None);
    }

    #[test]
    fn test_outgoing_message() {
        let record = parse(
            "tried to establish an outgoing connection to api.example.com on TCP port 443 (https).",
        );

        assert_eq!(record.direction, ConnectionDirection::Outgoing);
        assert_eq!(record.application, "api.example.com");
        assert_eq!(record.process, None);
        assert_eq!(record.protocol, NetworkProtocol::Tcp);
        assert_eq!(record.remote_port, Some(443));
        assert_eq!(record.service, Some(KnownService::Https));
    }

    #[test]
    fn test_connect_to_is_outgoing() {
        let record = parse("connect to server on TCP port 22");

        assert_eq!(record.direction, ConnectionDirection::Outgoing);
        assert_eq!(record.protocol, NetworkProtocol::Tcp);
        assert_eq!(record.remote_port, Some(22));
        assert_eq!(record.service, Some(KnownService::Ssh));
        // "connect to" is not "connection to"
        assert!(record.is_unknown_application());
    }

    #[test]
    fn test_direction_is_case_sensitive() {
        let record = parse("INCOMING CONNECTION to app on tcp port 80");
        assert_eq!(record.direction, ConnectionDirection::Outgoing);
    }

    #[test]
    fn test_markers_are_case_insensitive() {
        let record = parse("Connection To Mail VIA mailworker ON tcp PORT 25");
        assert_eq!(record.application, "Mail");
        assert_eq!(record.process.as_deref(), Some("mailworker"));
        assert_eq!(record.remote_port, Some(25));
        assert_eq!(record.service, Some(KnownService::Smtp));
    }

    #[test]
    fn test_port_without_service() {
        let record = parse("connection to app on UDP port 12345");
        assert_eq!(record.remote_port, Some(12345));
        assert_eq!(record.service, None);
    }

    #[test]
    fn test_service_hint_wins_over_port() {
        let record = parse("connection to app on TCP port 8080 (http)");
        assert_eq!(record.remote_port, Some(8080));
        assert_eq!(record.service, Some(KnownService::Http));

        // an unknown hint does not fall back to the port table
        let record = parse("connection to app on TCP port 443 (custom)");
        assert_eq!(record.service, None);
    }

    #[test]
    fn test_service_hint_alias() {
        let record = parse("connection to db via worker on TCP port 5432 (postgres)");
        assert_eq!(record.service, Some(KnownService::Postgresql));
    }

    #[test]
    fn test_only_first_port_is_used() {
        let record = parse("connection to app on TCP port 22 then port 443 (https)");
        assert_eq!(record.remote_port, Some(22));
        assert_eq!(record.service, Some(KnownService::Ssh));
    }

    #[test]
    fn test_port_out_of_range() {
        let record = parse("connection to app on TCP port 99999");
        assert_eq!(record.remote_port, Some(99999));
        assert_eq!(record.service, None);
        assert_eq!(record.display_description(), "app (TCP) on port 99999");

        // The hint still names the service
        let record = parse("connection to app on TCP port 70000 (http)");
        assert_eq!(record.remote_port, Some(70000));
        assert_eq!(record.service, Some(KnownService::Http));

        let record = parse("connection to app on TCP port 99999999999");
        assert_eq!(record.remote_port, None);
    }

    #[test]
    fn test_protocol_priority() {
        assert_eq!(parse("tcp and udp").protocol, NetworkProtocol::Udp);
        assert_eq!(parse("TCP then ICMP").protocol, NetworkProtocol::Tcp);
        assert_eq!(parse("an icmp echo").protocol, NetworkProtocol::Icmp);
        assert_eq!(parse("nothing here").protocol, NetworkProtocol::Unknown);
    }

    #[test]
    fn test_ipv4_address() {
        let record = parse("connection to server at 192.168.1.100 on TCP port 80");
        assert_eq!(record.remote_address.as_deref(), Some("192.168.1.100"));
        assert_eq!(record.remote_port, Some(80));
        assert_eq!(record.service, Some(KnownService::Http));
    }

    #[test]
    fn test_ipv4_address_is_not_range_checked() {
        let record = parse("connection to server at 999.1.1.1 on TCP port 80");
        assert_eq!(record.remote_address.as_deref(), Some("999.1.1.1"));
    }

    #[test]
    fn test_ipv6_address() {
        let record =
            parse("connection to 2601:205:4300:93f0:aeb2:20bf:20eb:c125 on UDP port 53");
        assert_eq!(
            record.remote_address.as_deref(),
            Some("2601:205:4300:93f0:aeb2:20bf:20eb:c125")
        );
        assert_eq!(record.remote_port, Some(53));
        assert_eq!(record.service, Some(KnownService::Dns));
    }

    #[test]
    fn test_ipv6_preferred_over_ipv4() {
        let record = parse("connection to 10.0.0.1 via relay on UDP port 53 from fe80::1");
        assert_eq!(record.remote_address.as_deref(), Some("fe80::1"));
    }

    #[test]
    fn test_ipv6_skips_invalid_candidates() {
        let record = parse("at 10:30:15 a connection to app from ::1 on TCP port 22");
        assert_eq!(record.remote_address.as_deref(), Some("::1"));

        let record = parse("at 10:30:15 a connection to 10.1.2.3 on TCP port 22");
        assert_eq!(record.remote_address.as_deref(), Some("10.1.2.3"));
    }

    #[test]
    fn test_ipv6_inside_word_is_ignored() {
        let record = parse("Note::1 says hello");
        assert_eq!(record.remote_address, None);
    }

    #[test]
    fn test_empty_message() {
        let record = parse("");

        assert!(record.is_unknown_application());
        assert_eq!(record.direction, ConnectionDirection::Outgoing);
        assert_eq!(record.process, None);
        assert_eq!(record.remote_address, None);
        assert_eq!(record.remote_port, None);
        assert_eq!(record.local_port, None);
        assert_eq!(record.protocol, NetworkProtocol::Unknown);
        assert_eq!(record.service, None);
        assert_eq!(record.raw_message, "");
    }

    #[test]
    fn test_malformed_message() {
        let record = parse("random text without structure");
        assert!(record.is_unknown_application());
        assert_eq!(record.raw_message, "random text without structure");
    }

    #[test]
    fn test_application_needs_terminator() {
        let record = parse("connection to Something");
        assert!(record.is_unknown_application());
    }

    #[test]
    fn test_process_runs_to_end_without_on() {
        let record = parse("connection to App via Helper Process");
        assert_eq!(record.application, "App");
        assert_eq!(record.process.as_deref(), Some("Helper Process"));
    }

    #[test]
    fn test_raw_message_is_untrimmed() {
        let message = "  \n connection to App on TCP port 80\n";
        let record = parse(message);
        assert_eq!(record.raw_message, message);
        assert_eq!(record.application, "App");
    }

    #[test]
    fn test_non_ascii_text() {
        let record = parse("connexión — connection to Café via Naïve on udp port 123");
        assert_eq!(record.application, "Café");
        assert_eq!(record.process.as_deref(), Some("Naïve"));
        assert_eq!(record.service, Some(KnownService::Ntp));
    }

    #[test]
    fn test_reparse_raw_message() {
        let record = parse(
            " tried to establish an incoming connection to Brave Browser via Brave Browser Helper on UDP port 5353 (mdns). ",
        );
        let mut again = parse(&record.raw_message);
        again.timestamp = record.timestamp;
        assert_eq!(again, record);
    }

    #[test]
    fn test_parse_address() {
        let parser = ConnectionMessageParser::new();
        assert!(parser.parse_address("8.8.8.8").is_some());
        assert!(parser.parse_address("8.8.8").is_none());
    }
}
