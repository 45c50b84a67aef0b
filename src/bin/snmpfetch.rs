//! snmpfetch - one-shot SNMP host data collection.
//!
//! Walks the Linux host subtrees of one agent, derives per-interface
//! metrics and prints them as JSON.

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use snmpfetch::collector::{Collector, SessionOptions, Target};
use snmpfetch::derive::{IndexDiscovery, InterfaceDeriver};

/// Collects host data from an SNMPv2c agent.
#[derive(Parser)]
#[command(name = "snmpfetch", about = "SNMP host data collector", version)]
struct Args {
    /// Agent host name or address.
    host: String,

    /// Agent UDP port.
    #[arg(short, long, default_value = "161")]
    port: u16,

    /// SNMPv2c community.
    #[arg(short, long, env = "SNMP_COMMUNITY", default_value = "public")]
    community: String,

    /// Response timeout in seconds.
    #[arg(long, default_value = "3")]
    timeout: u64,

    /// Retries per request after a timeout.
    #[arg(long, default_value = "2")]
    retries: u32,

    /// Report interfaces past holes in the ifName table.
    #[arg(long)]
    full_scan: bool,

    /// Print every collected OID before the report.
    #[arg(long)]
    dump: bool,

    /// Print the report on a single line.
    #[arg(long)]
    compact: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct Report {
    host: String,
    timestamp: i64,
    entries: usize,
    interfaces: BTreeMap<String, BTreeMap<String, u64>>,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so stdout stays valid JSON.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("snmpfetch={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let target = Target::new(&args.host, args.port, &args.community);
    let options = SessionOptions {
        timeout: Duration::from_secs(args.timeout),
        retries: args.retries,
        ..SessionOptions::default()
    };

    let mut collector = Collector::udp().with_options(options);
    let data = match collector.collect(&target) {
        Ok(data) => data,
        Err(e) => {
            error!("collection from {} failed: {}", target, e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(timing) = collector.last_timing() {
        let fallbacks = timing.subtrees.iter().filter(|s| s.fallback).count();
        info!(
            "collected {} entries from {} in {:?} ({} subtrees, {} sequential)",
            data.len(),
            target,
            timing.total,
            timing.subtrees.len(),
            fallbacks
        );
    }

    if args.dump {
        for (oid, value) in data.iter() {
            println!("{} = {}", oid, value);
        }
    }

    let discovery = if args.full_scan {
        IndexDiscovery::FullScan
    } else {
        IndexDiscovery::Contiguous
    };
    let interfaces = match InterfaceDeriver::new().with_discovery(discovery).derive(&data) {
        Ok(interfaces) => interfaces,
        Err(e) => {
            error!("failed to derive interface metrics: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = Report {
        host: args.host,
        timestamp: chrono::Utc::now().timestamp(),
        entries: data.len(),
        interfaces,
    };

    let rendered = if args.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    };
    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}
