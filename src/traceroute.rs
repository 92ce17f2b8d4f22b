//! Traceroute output interpretation and the runner that produces it

pub mod config;
pub mod error;
pub mod parser;
pub mod result;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use config::{TraceConfig, TraceConfigBuilder};
pub use error::TraceError;
pub use parser::{parse_hop_line, parse_line, parse_output};
pub use result::{TraceResult, TraceStatus};
pub use runner::{collect_hops, SystemTraceroute, TraceExecutor};
pub use types::{Hop, LatencyClass};
