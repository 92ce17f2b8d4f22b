//! Well-known network services and their ports

use serde::{Deserialize, Serialize};
use std::fmt;

/// A well-known service, identified by its fixed port.
///
/// The set is closed; lookups by port or by name return `None` for anything
/// outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownService {
    /// Hypertext Transfer Protocol
    Http,
    /// HTTP over TLS
    Https,
    /// Domain Name System
    Dns,
    /// Multicast DNS
    Mdns,
    /// Secure Shell
    Ssh,
    /// File Transfer Protocol
    Ftp,
    /// Simple Mail Transfer Protocol
    Smtp,
    /// Post Office Protocol v3
    Pop3,
    /// Internet Message Access Protocol
    Imap,
    /// Network Time Protocol
    Ntp,
    /// Lightweight Directory Access Protocol
    Ldap,
    /// Remote Desktop Protocol
    Rdp,
    /// MySQL server
    Mysql,
    /// PostgreSQL server
    Postgresql,
    /// Redis server
    Redis,
    /// MongoDB server
    Mongodb,
}

impl KnownService {
    /// Every known service, in table order
    pub const ALL: [KnownService; 16] = [
        Self::Http,
        Self::Https,
        Self::Dns,
        Self::Mdns,
        Self::Ssh,
        Self::Ftp,
        Self::Smtp,
        Self::Pop3,
        Self::Imap,
        Self::Ntp,
        Self::Ldap,
        Self::Rdp,
        Self::Mysql,
        Self::Postgresql,
        Self::Redis,
        Self::Mongodb,
    ];

    /// The service's well-known port
    pub fn port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
            Self::Dns => 53,
            Self::Mdns => 5353,
            Self::Ssh => 22,
            Self::Ftp => 21,
            Self::Smtp => 25,
            Self::Pop3 => 110,
            Self::Imap => 143,
            Self::Ntp => 123,
            Self::Ldap => 389,
            Self::Rdp => 3389,
            Self::Mysql => 3306,
            Self::Postgresql => 5432,
            Self::Redis => 6379,
            Self::Mongodb => 27017,
        }
    }

    /// Canonical lower-case name
    pub fn name(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Dns => "dns",
            Self::Mdns => "mdns",
            Self::Ssh => "ssh",
            Self::Ftp => "ftp",
            Self::Smtp => "smtp",
            Self::Pop3 => "pop3",
            Self::Imap => "imap",
            Self::Ntp => "ntp",
            Self::Ldap => "ldap",
            Self::Rdp => "rdp",
            Self::Mysql => "mysql",
            Self::Postgresql => "postgresql",
            Self::Redis => "redis",
            Self::Mongodb => "mongodb",
        }
    }

    /// Name suitable for display
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
            Self::Dns => "DNS",
            Self::Mdns => "mDNS (Bonjour)",
            Self::Ssh => "SSH",
            Self::Ftp => "FTP",
            Self::Smtp => "SMTP",
            Self::Pop3 => "POP3",
            Self::Imap => "IMAP",
            Self::Ntp => "NTP",
            Self::Ldap => "LDAP",
            Self::Rdp => "RDP",
            Self::Mysql => "MySQL",
            Self::Postgresql => "PostgreSQL",
            Self::Redis => "Redis",
            Self::Mongodb => "MongoDB",
        }
    }

    /// One-line human-readable description
    pub fn description(self) -> &'static str {
        match self {
            Self::Http => "Web traffic (unencrypted)",
            Self::Https => "Secure web traffic",
            Self::Dns => "Domain Name System queries",
            Self::Mdns => "Multicast DNS for local network discovery (Bonjour)",
            Self::Ssh => "Secure Shell remote access",
            Self::Ftp => "File Transfer Protocol",
            Self::Smtp => "Email sending",
            Self::Pop3 => "Email retrieval",
            Self::Imap => "Email access",
            Self::Ntp => "Network Time Protocol",
            Self::Ldap => "Directory services",
            Self::Rdp => "Remote Desktop Protocol",
            Self::Mysql => "MySQL database",
            Self::Postgresql => "PostgreSQL database",
            Self::Redis => "Redis cache/database",
            Self::Mongodb => "MongoDB database",
        }
    }

    /// Look up a service by exact port number
    pub fn from_port(port: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|service| u32::from(service.port()) == port)
    }

    /// Look up a service by name, ignoring case.
    ///
    /// Accepts the canonical names plus a few common aliases
    /// (`domain`, `mail`, `postgres`, `mongo`).
    pub fn from_name(name: &str) -> Option<Self> {
        let service = match name.to_lowercase().as_str() {
            "http" => Self::Http,
            "https" => Self::Https,
            "dns" | "domain" => Self::Dns,
            "mdns" => Self::Mdns,
            "ssh" => Self::Ssh,
            "ftp" => Self::Ftp,
            "smtp" | "mail" => Self::Smtp,
            "pop3" => Self::Pop3,
            "imap" => Self::Imap,
            "ntp" => Self::Ntp,
            "ldap" => Self::Ldap,
            "rdp" => Self::Rdp,
            "mysql" => Self::Mysql,
            "postgresql" | "postgres" => Self::Postgresql,
            "redis" => Self::Redis,
            "mongodb" | "mongo" => Self::Mongodb,
            _ => return None,
        };
        Some(service)
    }
}

impl fmt::Display for KnownService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
