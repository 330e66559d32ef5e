//! Command-line arguments for the forex provider.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use forex_common::net::PROVIDER_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// IP address to bind the provider socket on.
    #[clap(long, default_value = "127.0.0.1")]
    pub bind_ip: String,

    /// UDP port accepting subscription requests.
    #[clap(long, default_value_t = PROVIDER_PORT)]
    pub port: u16,

    /// Milliseconds between published quote batches.
    #[clap(long, default_value_t = 500)]
    pub publish_interval_ms: u64,

    /// Seconds a subscription stays active without renewal.
    #[clap(long, default_value_t = 600)]
    pub subscription_secs: u64,
}
