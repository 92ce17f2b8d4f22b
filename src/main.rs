//! tracelens - interpret traceroute output and firewall connection messages.
//!
//! This is the command-line interface for the tracelens library.

#![allow(clippy::uninlined_format_args)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracelens::traceroute::parser::parse_output;
use tracelens::{
    AddressLiteral, ConnectionMessageParser, ConnectionRecord, Hop, KnownService,
    SystemTraceroute, TraceConfigBuilder, TraceExecutor, TraceResult,
};
use tracing_subscriber::EnvFilter;

/// Get the version string for tracelens
fn get_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(env!("CARGO_PKG_VERSION"), "-UNRELEASED")
    } else {
        env!("CARGO_PKG_VERSION")
    }
}

/// Command-line arguments for tracelens.
#[derive(Parser, Debug)]
#[clap(
    author,
    version = get_version(),
    about = "Interpret traceroute output and firewall connection messages",
    long_about = None
)]
struct Args {
    #[clap(subcommand)]
    command: Commands,

    /// Output results in JSON format
    #[clap(long, global = true)]
    json: bool,

    /// Enable verbose output (repeat for more detail)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the system traceroute and print hops as they arrive
    Trace {
        /// Target hostname or IP address
        host: String,

        /// Maximum number of hops
        #[clap(short = 'm', long, default_value_t = 30)]
        max_hops: u8,

        /// Seconds to wait for each probe
        #[clap(short = 'w', long, default_value_t = 5)]
        wait_secs: u64,

        /// Number of probes per hop
        #[clap(short = 'q', long)]
        queries: Option<u8>,

        /// Give up after this many seconds
        #[clap(long)]
        overall_timeout_secs: Option<u64>,
    },

    /// Parse captured traceroute output from a file or stdin
    Hops {
        /// File holding traceroute output (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Parse a firewall connection message
    Connection {
        /// Message words (stdin when omitted)
        message: Vec<String>,
    },

    /// Validate an IPv4 or IPv6 address literal
    Address {
        /// Text to validate
        text: String,
    },

    /// Look up a well-known service by port or name
    Service {
        /// Port number or service name
        query: String,
    },
}

/// JSON output structure for an address check
#[derive(Debug, serde::Serialize)]
struct JsonAddress<'a> {
    kind: &'static str,
    address: &'a str,
}

/// JSON output structure for a known service
#[derive(Debug, serde::Serialize)]
struct JsonService {
    name: &'static str,
    port: u16,
    display_name: &'static str,
    description: &'static str,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let json = args.json;
    let result = match args.command {
        Commands::Trace {
            host,
            max_hops,
            wait_secs,
            queries,
            overall_timeout_secs,
        } => run_trace(&host, max_hops, wait_secs, queries, overall_timeout_secs, json),
        Commands::Hops { file } => run_hops(file, json),
        Commands::Connection { message } => run_connection(&message, json),
        Commands::Address { text } => run_address(&text, json),
        Commands::Service { query } => run_service(&query, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_trace(
    host: &str,
    max_hops: u8,
    wait_secs: u64,
    queries: Option<u8>,
    overall_timeout_secs: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut builder = TraceConfigBuilder::from_env()
        .target(host)
        .max_hops(max_hops)
        .probe_timeout(Duration::from_secs(wait_secs));
    if let Some(queries) = queries {
        builder = builder.queries_per_hop(queries);
    }
    if let Some(secs) = overall_timeout_secs {
        builder = builder.overall_timeout(Duration::from_secs(secs));
    }
    let config = builder.build()?;

    // Single-threaded runtime; only the child process and Ctrl-C need driving
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_ctrl_c.cancel();
            }
        });

        if !json {
            println!(
                "tracelens to {} via {}, {} max hops, {}s probe timeout",
                config.target,
                config.program(),
                config.max_hops,
                config.probe_timeout.as_secs()
            );
        }

        let mut print_hop = move |hop: &Hop| {
            if !json {
                println!("{}", format_hop(hop));
            }
        };
        let result = SystemTraceroute::new()
            .trace(&config, cancel, &mut print_hop)
            .await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("\n{}", format_summary(&result));
        }
        Ok::<(), anyhow::Error>(())
    })
}

fn run_hops(file: Option<PathBuf>, json: bool) -> Result<()> {
    let output = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => read_stdin()?,
    };

    let hops = parse_output(&output);
    if json {
        println!("{}", serde_json::to_string_pretty(&hops)?);
    } else {
        for hop in &hops {
            println!("{}", format_hop(hop));
        }
    }
    Ok(())
}

fn run_connection(words: &[String], json: bool) -> Result<()> {
    let message = if words.is_empty() {
        read_stdin()?
    } else {
        words.join(" ")
    };

    let record = ConnectionMessageParser::new().parse(&message);
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", format_connection(&record));
    }
    Ok(())
}

fn run_address(text: &str, json: bool) -> Result<()> {
    let Some(address) = AddressLiteral::parse(text) else {
        bail!("invalid address: {}", text.trim());
    };

    let kind = if address.is_ipv6() { "IPv6" } else { "IPv4" };
    if json {
        let output = JsonAddress {
            kind: if address.is_ipv6() { "ipv6" } else { "ipv4" },
            address: address.as_str(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} {}", kind, address);
    }
    Ok(())
}

fn run_service(query: &str, json: bool) -> Result<()> {
    let Some(service) = lookup_service(query) else {
        bail!("unknown service: {}", query);
    };

    if json {
        let output = JsonService {
            name: service.name(),
            port: service.port(),
            display_name: service.display_name(),
            description: service.description(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} {}/{} - {}",
            service.display_name(),
            service.port(),
            service.name(),
            service.description()
        );
    }
    Ok(())
}

/// Numeric queries are ports, anything else is a name
fn lookup_service(query: &str) -> Option<KnownService> {
    match query.trim().parse::<u32>() {
        Ok(port) => KnownService::from_port(port),
        Err(_) => KnownService::from_name(query.trim()),
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;
    Ok(input)
}

/// Format one hop as a line of text
fn format_hop(hop: &Hop) -> String {
    if hop.is_timeout {
        return format!("{:2}  * * *", hop.hop_number);
    }

    let rtts = hop
        .round_trip_times
        .iter()
        .map(|rtt| format!("{:.3} ms", rtt))
        .collect::<Vec<_>>()
        .join("  ");

    format!(
        "{:2}  {}  {}  [{}]",
        hop.hop_number,
        hop.display_address(),
        if rtts.is_empty() { "*".to_string() } else { rtts },
        hop.latency_class()
    )
}

fn format_summary(result: &TraceResult) -> String {
    let mut summary = format!(
        "{} hops to {} ({} timed out)",
        result.hop_count(),
        result.target,
        result.timeout_count()
    );
    if let Some(avg) = result.average_rtt_ms() {
        summary.push_str(&format!(", average RTT {:.3} ms", avg));
    }
    if let Some(duration) = result.duration() {
        summary.push_str(&format!(", finished in {:.1}s", duration.as_secs_f64()));
    }
    summary
}

fn format_connection(record: &ConnectionRecord) -> String {
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let service = record
        .service
        .map(|s| format!("{} - {}", s.display_name(), s.description()));

    [
        format!("Direction:   {}", record.direction),
        format!("Application: {}", record.application),
        format!("Process:     {}", or_dash(record.process.clone())),
        format!("Protocol:    {}", record.protocol),
        format!("Port:        {}", or_dash(record.remote_port.map(|p| p.to_string()))),
        format!("Service:     {}", or_dash(service)),
        format!("Address:     {}", or_dash(record.remote_address.clone())),
        format!("Summary:     {}", record.display_description()),
    ]
    .join("\n")
}
