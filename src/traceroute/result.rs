//! Result types for traceroute runs

use crate::traceroute::types::Hop;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Result of a traceroute run
///
/// Created empty when a run starts, filled as hops stream in, and finalized
/// with an end time once the command terminates.
///
/// # Examples
///
/// ```
/// use tracelens::{Hop, TraceResult};
///
/// let mut result = TraceResult::new("8.8.8.8");
/// result.push_hop(Hop::new(1, Some("192.168.1.1".to_string()), None, vec![1.0]));
/// result.push_hop(Hop::timeout(2));
/// result.finish();
///
/// assert!(result.is_complete);
/// assert_eq!(result.hop_count(), 2);
/// assert!(result.duration().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Target hostname or address as provided
    pub target: String,
    /// When the run started
    pub start_time: SystemTime,
    /// When the run ended, if it has
    pub end_time: Option<SystemTime>,
    /// Hops in the order they were reported
    pub hops: Vec<Hop>,
    /// The command ran to completion
    pub is_complete: bool,
    /// Failure description for runs that did not complete
    pub error_message: Option<String>,
}

impl TraceResult {
    /// Start a new, empty result stamped with the current time
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            start_time: SystemTime::now(),
            end_time: None,
            hops: Vec::new(),
            is_complete: false,
            error_message: None,
        }
    }

    /// Append a hop as it is reported
    pub fn push_hop(&mut self, hop: Hop) {
        self.hops.push(hop);
    }

    /// Mark the run as finished now
    pub fn finish(&mut self) {
        self.end_time = Some(SystemTime::now());
        self.is_complete = true;
    }

    /// Mark the run as failed now
    pub fn fail(&mut self, message: impl Into<String>) {
        self.end_time = Some(SystemTime::now());
        self.is_complete = false;
        self.error_message = Some(message.into());
    }

    /// Time between start and end, once the run has ended
    pub fn duration(&self) -> Option<Duration> {
        self.end_time
            .map(|end| end.duration_since(self.start_time).unwrap_or_default())
    }

    /// Number of hops reported
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// Highest hop number seen
    pub fn max_hop_number(&self) -> Option<u32> {
        self.hops.iter().map(|h| h.hop_number).max()
    }

    /// Number of hops where every probe timed out
    pub fn timeout_count(&self) -> usize {
        self.hops.iter().filter(|h| h.is_timeout).count()
    }

    /// The most recently reported hop
    pub fn last_hop(&self) -> Option<&Hop> {
        self.hops.last()
    }

    /// Mean of the per-hop average RTTs across responding hops
    pub fn average_rtt_ms(&self) -> Option<f64> {
        let rtts: Vec<f64> = self.hops.iter().filter_map(Hop::average_rtt).collect();

        if rtts.is_empty() {
            None
        } else {
            Some(rtts.iter().sum::<f64>() / rtts.len() as f64)
        }
    }

    /// Status snapshot, with progress measured against `max_hops`
    pub fn status(&self, max_hops: u8) -> TraceStatus {
        if let Some(message) = &self.error_message {
            return TraceStatus::Failed(message.clone());
        }
        if self.is_complete {
            return TraceStatus::Completed;
        }
        match self.last_hop() {
            Some(hop) => TraceStatus::running(hop.hop_number, max_hops),
            None => TraceStatus::Running { progress: 0.0 },
        }
    }
}

/// Status of a traceroute run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceStatus {
    /// Nothing started yet
    Idle,
    /// Hops are streaming in
    Running {
        /// Fraction of the hop budget seen so far, below 1.0
        progress: f64,
    },
    /// The command finished
    Completed,
    /// The run failed with the given message
    Failed(String),
}

impl TraceStatus {
    /// Running status after `hop_number` of `max_hops`, capped at 0.99
    pub fn running(hop_number: u32, max_hops: u8) -> Self {
        let progress = if max_hops == 0 {
            0.0
        } else {
            f64::from(hop_number) / f64::from(max_hops)
        };
        TraceStatus::Running {
            progress: progress.min(0.99),
        }
    }

    /// Returns true once the run has completed or failed
    pub fn is_finished(&self) -> bool {
        matches!(self, TraceStatus::Completed | TraceStatus::Failed(_))
    }
}
