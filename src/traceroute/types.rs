//! Core types for traceroute hops

use serde::{Deserialize, Serialize};
use std::fmt;

/// One hop reported by a traceroute run.
///
/// A timeout hop carries no address, hostname or samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    /// Hop number (TTL), starting at 1
    pub hop_number: u32,
    /// Numeric address of the responding router
    pub address: Option<String>,
    /// Reverse-resolved name of the responding router
    pub hostname: Option<String>,
    /// Round-trip time samples in milliseconds, in output order
    pub round_trip_times: Vec<f64>,
    /// Every probe for this hop timed out
    pub is_timeout: bool,
}

impl Hop {
    /// Create a responding hop
    pub fn new(
        hop_number: u32,
        address: Option<String>,
        hostname: Option<String>,
        round_trip_times: Vec<f64>,
    ) -> Self {
        Self {
            hop_number,
            address,
            hostname,
            round_trip_times,
            is_timeout: false,
        }
    }

    /// Create a hop where every probe timed out
    pub fn timeout(hop_number: u32) -> Self {
        Self {
            hop_number,
            address: None,
            hostname: None,
            round_trip_times: Vec::new(),
            is_timeout: true,
        }
    }

    /// Mean of the RTT samples in milliseconds
    pub fn average_rtt(&self) -> Option<f64> {
        if self.round_trip_times.is_empty() {
            None
        } else {
            Some(self.round_trip_times.iter().sum::<f64>() / self.round_trip_times.len() as f64)
        }
    }

    /// `"host (addr)"`, the host or address alone, or `"*"`
    pub fn display_address(&self) -> String {
        match (&self.hostname, &self.address) {
            (Some(hostname), Some(address)) => format!("{hostname} ({address})"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => "*".to_string(),
        }
    }

    /// Bucket the hop by its average RTT
    pub fn latency_class(&self) -> LatencyClass {
        if self.is_timeout {
            return LatencyClass::Timeout;
        }
        match self.average_rtt() {
            None => LatencyClass::Unknown,
            Some(rtt) if rtt < 20.0 => LatencyClass::Fast,
            Some(rtt) if rtt < 50.0 => LatencyClass::Good,
            Some(rtt) if rtt < 100.0 => LatencyClass::Fair,
            Some(_) => LatencyClass::Slow,
        }
    }
}

/// Coarse latency bucket for a hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyClass {
    /// Under 20 ms
    Fast,
    /// 20 to 50 ms
    Good,
    /// 50 to 100 ms
    Fair,
    /// 100 ms or more
    Slow,
    /// All probes timed out
    Timeout,
    /// Responded without usable samples
    Unknown,
}

impl fmt::Display for LatencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatencyClass::Fast => write!(f, "FAST"),
            LatencyClass::Good => write!(f, "GOOD"),
            LatencyClass::Fair => write!(f, "FAIR"),
            LatencyClass::Slow => write!(f, "SLOW"),
            LatencyClass::Timeout => write!(f, "TIMEOUT"),
            LatencyClass::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hop_creation() {
        let hop = Hop::new(
            1,
            Some("192.168.1.1".to_string()),
            Some("router.local".to_string()),
            vec![1.5, 2.0, 1.8],
        );

        assert_eq!(hop.hop_number, 1);
        assert_eq!(hop.address.as_deref(), Some("192.168.1.1"));
        assert_eq!(hop.hostname.as_deref(), Some("router.local"));
        assert_eq!(hop.round_trip_times.len(), 3);
        assert!(!hop.is_timeout);
    }

    #[test]
    fn test_average_rtt() {
        let hop = Hop::new(1, None, None, vec![10.0, 20.0, 30.0]);
        assert!((hop.average_rtt().unwrap() - 20.0).abs() < 0.001);

        let hop = Hop::new(1, None, None, Vec::new());
        assert_eq!(hop.average_rtt(), None);
    }

    #[test]
    fn test_timeout_hop() {
        let hop = Hop::timeout(2);
        assert!(hop.is_timeout);
        assert_eq!(hop.address, None);
        assert_eq!(hop.hostname, None);
        assert!(hop.round_trip_times.is_empty());
        assert_eq!(hop.display_address(), "*");
    }

    #[test]
    fn test_display_address() {
        let hop = Hop::new(
            1,
            Some("192.168.1.1".to_string()),
            Some("router.local".to_string()),
            Vec::new(),
        );
        assert_eq!(hop.display_address(), "router.local (192.168.1.1)");

        let hop = Hop::new(2, Some("10.0.0.1".to_string()), None, Vec::new());
        assert_eq!(hop.display_address(), "10.0.0.1");

        let hop = Hop::new(3, None, Some("server.local".to_string()), Vec::new());
        assert_eq!(hop.display_address(), "server.local");
    }

    #[test]
    fn test_latency_class() {
        assert_eq!(Hop::timeout(1).latency_class(), LatencyClass::Timeout);
        assert_eq!(
            Hop::new(1, None, None, Vec::new()).latency_class(),
            LatencyClass::Unknown
        );
        assert_eq!(
            Hop::new(1, None, None, vec![5.0]).latency_class(),
            LatencyClass::Fast
        );
        assert_eq!(
            Hop::new(1, None, None, vec![20.0]).latency_class(),
            LatencyClass::Good
        );
        assert_eq!(
            Hop::new(1, None, None, vec![60.0, 80.0]).latency_class(),
            LatencyClass::Fair
        );
        assert_eq!(
            Hop::new(1, None, None, vec![100.0]).latency_class(),
            LatencyClass::Slow
        );
        assert_eq!(LatencyClass::Slow.to_string(), "SLOW");
    }
}
