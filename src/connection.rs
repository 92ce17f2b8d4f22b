//! Interpretation of firewall connection notifications

pub mod parser;
pub mod service;
pub mod types;

pub use parser::ConnectionMessageParser;
pub use service::KnownService;
pub use types::{ConnectionDirection, ConnectionRecord, NetworkProtocol, UNKNOWN_APPLICATION};
