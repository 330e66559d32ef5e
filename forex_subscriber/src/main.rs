//! Forex Subscriber — a UDP client that subscribes to a Forex Provider price
//! feed, keeps the freshest quote per currency pair, and reports arbitrage
//! opportunities the moment the rate graph shows one.
//!
//! Usage example (CLI):
//! ```bash
//! forex_subscriber --provider-ip 192.168.0.10 --listen-port 10000
//! ```
//!
//! The subscriber announces its own listening address to the provider, then
//! consumes quote datagrams until the feed goes quiet (60s by default) or
//! the subscription window (600s) lapses, whichever comes first. Detected
//! cycles go to the log and, with `--report-path`, to a JSON Lines file.
#![warn(missing_docs)]
mod args;
mod detector;
mod graph;
mod pipeline;
mod report;
mod store;

use crate::args::Args;
use crate::detector::Cycle;
use crate::report::{ArbitrageSink, JsonLinesSink, LogSink};
use crate::store::QuoteStore;
use chrono::Utc;
use clap::Parser;
use forex_common::net;
use forex_common::wire;
use forex_common::FeedError;
use forex_common::Result;
use log::{error, info, warn};
use std::fs::File;
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

/// Fans each report out to the log and, when configured, a JSON Lines file.
struct Sinks {
    log: LogSink,
    json: Option<JsonLinesSink<File>>,
}

impl ArbitrageSink for Sinks {
    fn publish(&mut self, cycle: &Cycle) -> Result<()> {
        self.log.publish(cycle)?;
        if let Some(json) = self.json.as_mut() {
            json.publish(cycle)?;
        }
        Ok(())
    }
}

/// Runs the blocking receive loop until the subscription window lapses, the
/// feed goes idle, or a shutdown is requested.
///
/// Malformed datagrams are logged and dropped; both timeout paths are normal
/// termination, not errors.
fn run_subscription_loop(
    socket: &UdpSocket,
    store: &mut QuoteStore,
    sink: &mut dyn ArbitrageSink,
    run_window: Duration,
    idle_timeout: Duration,
    shutdown: &AtomicBool,
) -> Result<(), FeedError> {
    let started = Instant::now();
    let mut buf = [0u8; net::BUF_SZ];

    while !shutdown.load(Ordering::Relaxed) {
        if started.elapsed() >= run_window {
            info!(
                "subscription window of {}s elapsed; exiting",
                run_window.as_secs()
            );
            break;
        }
        match socket.recv_from(&mut buf) {
            Ok((size, _)) => {
                if let Err(e) = pipeline::process_datagram(store, &buf[..size], Utc::now(), sink) {
                    warn!("dropping datagram: {}", e);
                }
            }
            Err(e) => {
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut {
                    info!(
                        "no quotes received for {}s; exiting",
                        idle_timeout.as_secs()
                    );
                    break;
                }
                error!("Receive data error: {}", e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), FeedError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down subscriber...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .expect("Error setting Ctrl+C handler");
    }

    let socket = UdpSocket::bind(net::addr(&args.listen_ip, args.listen_port))?;
    socket.set_read_timeout(Some(Duration::from_secs(args.idle_timeout_secs)))?;
    let local_addr = socket.local_addr()?;
    info!("quote listener bound on {}", local_addr);

    let frame = wire::encode_subscription(&local_addr)?;
    let provider_address = net::addr(&args.provider_ip, args.provider_port);
    socket.send_to(&frame, &provider_address)?;
    info!("subscription for {} sent to {}", local_addr, provider_address);

    let json = match &args.report_path {
        Some(path) => Some(JsonLinesSink::new(File::create(path)?)),
        None => None,
    };
    let mut sink = Sinks { log: LogSink, json };
    let mut store = QuoteStore::new();

    run_subscription_loop(
        &socket,
        &mut store,
        &mut sink,
        Duration::from_secs(args.run_secs),
        Duration::from_secs(args.idle_timeout_secs),
        &shutdown,
    )?;

    info!("ledger at exit: {}", store.status_counts());
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
