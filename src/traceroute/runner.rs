//! Running the system traceroute and streaming its hops
//!
//! The command's stdout is read line by line; every hop line is parsed and
//! handed to the caller as soon as it arrives, then appended to the result.

use crate::traceroute::config::TraceConfig;
use crate::traceroute::error::TraceError;
use crate::traceroute::parser::parse_line;
use crate::traceroute::result::TraceResult;
use crate::traceroute::types::Hop;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Something that can run a traceroute and stream its hops
#[async_trait]
pub trait TraceExecutor: Send + Sync {
    /// Run a traceroute described by `config`.
    ///
    /// `on_hop` is called once per hop, in output order, while the run is in
    /// progress. Cancelling `cancel` stops the run.
    async fn trace(
        &self,
        config: &TraceConfig,
        cancel: CancellationToken,
        on_hop: &mut (dyn for<'h> FnMut(&'h Hop) + Send),
    ) -> Result<TraceResult, TraceError>;
}

/// Runs the operating system's `traceroute` / `traceroute6` binary
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTraceroute;

impl SystemTraceroute {
    /// Create a new runner
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TraceExecutor for SystemTraceroute {
    async fn trace(
        &self,
        config: &TraceConfig,
        cancel: CancellationToken,
        on_hop: &mut (dyn for<'h> FnMut(&'h Hop) + Send),
    ) -> Result<TraceResult, TraceError> {
        config.validate()?;

        let program = config.program();
        let args = config.args();
        info!(program, ?args, "Starting traceroute");

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TraceError::Io(std::io::Error::other("stdout was not captured")))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| TraceError::Io(std::io::Error::other("stderr was not captured")))?;

        // Drain stderr alongside stdout so neither pipe can fill up
        let stderr_task = tokio::spawn(async move {
            let mut bytes = Vec::new();
            let _ = stderr.read_to_end(&mut bytes).await;
            bytes
        });

        let mut result = TraceResult::new(config.target.clone());
        let deadline = async {
            match config.overall_timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        // A child can close stdout and keep running, so the exit wait is raced too
        let outcome = tokio::select! {
            exit = async {
                collect_hops(BufReader::new(stdout), &mut result, on_hop).await?;
                Ok::<_, TraceError>(child.wait().await?)
            } => exit,
            _ = cancel.cancelled() => Err(TraceError::Cancelled),
            _ = deadline => Err(TraceError::Timeout),
        };

        let status = match outcome {
            Ok(status) => status,
            Err(err @ (TraceError::Cancelled | TraceError::Timeout)) => {
                if matches!(err, TraceError::Timeout) {
                    warn!(dest = %config.target, "Traceroute exceeded overall timeout");
                } else {
                    debug!("Cancelling traceroute");
                }
                child.kill().await?;
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let stderr_bytes = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let stderr_text = String::from_utf8_lossy(&stderr_bytes);
            let message = stderr_text.trim();
            warn!(%status, stderr = message, "Traceroute exited unsuccessfully");
            if !message.is_empty() {
                return Err(TraceError::CommandFailed(message.to_string()));
            }
        }

        result.finish();
        info!(
            hops = result.hop_count(),
            duration_ms = result.duration().map(|d| d.as_millis() as u64),
            "Traceroute finished"
        );
        Ok(result)
    }
}

/// Read traceroute output from `reader`, streaming each hop to `on_hop`
/// and appending it to `result`.
///
/// Works with any buffered reader, so captured output can be replayed
/// through the same path as a live command.
pub async fn collect_hops<R>(
    reader: R,
    result: &mut TraceResult,
    on_hop: &mut (dyn for<'h> FnMut(&'h Hop) + Send),
) -> Result<(), TraceError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.map_err(read_error)? {
        if let Some(hop) = parse_line(&line) {
            debug!(hop = hop.hop_number, timeout = hop.is_timeout, "Received hop");
            on_hop(&hop);
            result.push_hop(hop);
        }
    }

    Ok(())
}

fn read_error(err: std::io::Error) -> TraceError {
    if err.kind() == std::io::ErrorKind::InvalidData {
        TraceError::ParseError("Failed to decode output".to_string())
    } else {
        TraceError::Io(err)
    }
}
