//! Configuration types for traceroute runs

use crate::traceroute::error::TraceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the IPv4 traceroute binary
pub const TRACEROUTE_PATH_ENV: &str = "TRACELENS_TRACEROUTE";
/// Environment variable overriding the IPv6 traceroute binary
pub const TRACEROUTE6_PATH_ENV: &str = "TRACELENS_TRACEROUTE6";

/// Default IPv4 traceroute binary, looked up on `PATH`
pub const DEFAULT_TRACEROUTE_PATH: &str = "traceroute";
/// Default IPv6 traceroute binary, looked up on `PATH`
pub const DEFAULT_TRACEROUTE6_PATH: &str = "traceroute6";

/// Configuration for a traceroute run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Target hostname or IP address
    pub target: String,
    /// Maximum number of hops (default: 30)
    pub max_hops: u8,
    /// Wait time for each probe (default: 5s)
    pub probe_timeout: Duration,
    /// Probes per hop; `None` leaves the command's default
    pub queries_per_hop: Option<u8>,
    /// Kill the command after this long
    pub overall_timeout: Option<Duration>,
    /// Binary used for IPv4 targets and hostnames
    pub traceroute_path: String,
    /// Binary used for IPv6 targets
    pub traceroute6_path: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            max_hops: 30,
            probe_timeout: Duration::from_secs(5),
            queries_per_hop: None,
            overall_timeout: None,
            traceroute_path: DEFAULT_TRACEROUTE_PATH.to_string(),
            traceroute6_path: DEFAULT_TRACEROUTE6_PATH.to_string(),
        }
    }
}

impl TraceConfig {
    /// Create a new TraceConfig builder
    pub fn builder() -> TraceConfigBuilder {
        TraceConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.target.is_empty() {
            return Err(TraceError::InvalidTarget(
                "Target must be specified".to_string(),
            ));
        }
        if self.target.starts_with('-') || self.target.chars().any(char::is_whitespace) {
            return Err(TraceError::InvalidTarget(self.target.clone()));
        }
        if self.max_hops == 0 {
            return Err(TraceError::ConfigError(
                "max_hops must be at least 1".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(TraceError::ConfigError(
                "probe_timeout must be greater than 0".to_string(),
            ));
        }
        if self.queries_per_hop == Some(0) {
            return Err(TraceError::ConfigError(
                "queries_per_hop must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the target is an IPv6 literal
    pub fn is_ipv6_target(&self) -> bool {
        self.target.contains(':')
    }

    /// Binary to run for this target
    pub fn program(&self) -> &str {
        if self.is_ipv6_target() {
            &self.traceroute6_path
        } else {
            &self.traceroute_path
        }
    }

    /// Command-line arguments for this configuration
    pub fn args(&self) -> Vec<String> {
        // -w takes whole seconds
        let wait_secs = self.probe_timeout.as_secs().max(1);

        let mut args = vec![
            "-m".to_string(),
            self.max_hops.to_string(),
            "-w".to_string(),
            wait_secs.to_string(),
        ];
        if let Some(queries) = self.queries_per_hop {
            args.push("-q".to_string());
            args.push(queries.to_string());
        }
        args.push(self.target.clone());
        args
    }
}

/// Builder for TraceConfig
#[derive(Debug, Default)]
pub struct TraceConfigBuilder {
    config: TraceConfig,
}

impl TraceConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with binary paths taken from the environment
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Ok(path) = std::env::var(TRACEROUTE_PATH_ENV) {
            builder.config.traceroute_path = path;
        }
        if let Ok(path) = std::env::var(TRACEROUTE6_PATH_ENV) {
            builder.config.traceroute6_path = path;
        }
        builder
    }

    /// Set the target hostname or IP address
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.config.target = target.into();
        self
    }

    /// Set the maximum number of hops
    pub fn max_hops(mut self, hops: u8) -> Self {
        self.config.max_hops = hops;
        self
    }

    /// Set the per-probe wait time
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Set the number of probes per hop
    pub fn queries_per_hop(mut self, queries: u8) -> Self {
        self.config.queries_per_hop = Some(queries);
        self
    }

    /// Set the overall timeout
    pub fn overall_timeout(mut self, timeout: Duration) -> Self {
        self.config.overall_timeout = Some(timeout);
        self
    }

    /// Set the IPv4 traceroute binary
    pub fn traceroute_path(mut self, path: impl Into<String>) -> Self {
        self.config.traceroute_path = path.into();
        self
    }

    /// Set the IPv6 traceroute binary
    pub fn traceroute6_path(mut self, path: impl Into<String>) -> Self {
        self.config.traceroute6_path = path.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<TraceConfig, TraceError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
