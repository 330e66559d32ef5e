//! Command-line arguments for the forex subscriber.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;
use forex_common::net::{PROVIDER_PORT, SUBSCRIBER_PORT};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// IP address where the price provider is running.
    #[clap(long, default_value = "127.0.0.1")]
    pub provider_ip: String,

    /// Provider UDP port accepting subscription requests.
    #[clap(long, default_value_t = PROVIDER_PORT)]
    pub provider_port: u16,

    /// Local IPv4 address to bind for receiving quote datagrams.
    #[clap(long, default_value = "127.0.0.1")]
    pub listen_ip: String,

    /// Local UDP port to bind for receiving quote datagrams.
    #[clap(long, default_value_t = SUBSCRIBER_PORT)]
    pub listen_port: u16,

    /// Stop after this many seconds without any datagram.
    #[clap(long, default_value_t = 60)]
    pub idle_timeout_secs: u64,

    /// Total run cap in seconds; the provider forgets subscribers on the
    /// same schedule.
    #[clap(long, default_value_t = 600)]
    pub run_secs: u64,

    /// Optional file receiving one JSON object per detected cycle.
    #[clap(long)]
    pub report_path: Option<PathBuf>,
}
