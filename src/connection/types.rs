//! Data model for parsed firewall connection messages

use crate::connection::service::KnownService;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Application name used when none can be extracted
pub const UNKNOWN_APPLICATION: &str = "Unknown Application";

/// Direction of a network connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionDirection {
    /// Remote peer connecting to a local application
    Incoming,
    /// Local application connecting out
    Outgoing,
}

impl ConnectionDirection {
    /// Capitalized name for display
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Incoming => "Incoming",
            Self::Outgoing => "Outgoing",
        }
    }

    /// Symbol name used by the desktop front end
    pub fn icon(self) -> &'static str {
        match self {
            Self::Incoming => "arrow.down.circle.fill",
            Self::Outgoing => "arrow.up.circle.fill",
        }
    }
}

impl fmt::Display for ConnectionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Transport protocol named in a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkProtocol {
    /// Transmission Control Protocol
    Tcp,
    /// User Datagram Protocol
    Udp,
    /// Internet Control Message Protocol
    Icmp,
    /// No protocol mentioned
    Unknown,
}

impl fmt::Display for NetworkProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkProtocol::Tcp => write!(f, "TCP"),
            NetworkProtocol::Udp => write!(f, "UDP"),
            NetworkProtocol::Icmp => write!(f, "ICMP"),
            NetworkProtocol::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Structured interpretation of one firewall notification line.
///
/// `raw_message` always holds the input exactly as given, so a record can be
/// re-parsed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Connection direction
    pub direction: ConnectionDirection,
    /// Application name, or [`UNKNOWN_APPLICATION`]
    pub application: String,
    /// Helper process named after "via"
    pub process: Option<String>,
    /// Remote peer address text
    pub remote_address: Option<String>,
    /// Port named in the message
    pub remote_port: Option<u32>,
    /// Local port, when known
    pub local_port: Option<u32>,
    /// Transport protocol
    pub protocol: NetworkProtocol,
    /// Known service classification
    pub service: Option<KnownService>,
    /// Unmodified input text
    pub raw_message: String,
    /// When the record was captured
    pub timestamp: SystemTime,
}

impl ConnectionRecord {
    /// One-line summary, e.g. `"Brave Browser using mDNS (Bonjour) on port 5353"`
    pub fn display_description(&self) -> String {
        match (self.remote_port.or(self.local_port), self.service) {
            (Some(port), Some(service)) => format!(
                "{} using {} on port {}",
                self.application,
                service.display_name(),
                port
            ),
            (Some(port), None) => {
                format!("{} ({}) on port {}", self.application, self.protocol, port)
            }
            (None, _) => format!("{} ({})", self.application, self.protocol),
        }
    }

    /// Returns true when no application name could be extracted
    pub fn is_unknown_application(&self) -> bool {
        self.application == UNKNOWN_APPLICATION
    }
}
