//! tracelens - interpretation of traceroute output and firewall connection logs
//!
//! This library turns loosely formatted text into typed records: hop lines
//! from the system `traceroute` command, free-text firewall notifications,
//! and IPv4/IPv6 address literals. It can also drive the system traceroute
//! binary and stream hops as they are printed.

pub mod address;
pub mod connection;
pub mod traceroute;

// Re-export core types for library users
pub use address::{AddressLiteral, InvalidAddress};
pub use connection::{
    ConnectionDirection, ConnectionMessageParser, ConnectionRecord, KnownService,
    NetworkProtocol, UNKNOWN_APPLICATION,
};
pub use traceroute::{
    collect_hops, Hop, LatencyClass, SystemTraceroute, TraceConfig, TraceConfigBuilder,
    TraceError, TraceExecutor, TraceResult, TraceStatus,
};
