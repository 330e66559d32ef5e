//! Forex Provider — a UDP price feed that streams synthetic exchange-rate
//! quotes to subscribers.
//!
//! This binary binds one UDP socket and wires together three building
//! blocks:
//!
//! - `RateGenerator` — produces quote batches (`FeedEvent`) on a fixed
//!   cadence and hands them over via `crossbeam_channel`.
//! - Enrollment listener — a background thread decoding 6-byte subscription
//!   datagrams and enrolling the requested delivery address.
//! - Publisher loop — encodes each batch into one datagram and sends it to
//!   every live subscriber, sweeping expired subscriptions first.
//!
//! Subscriptions expire after a TTL (default 600s) unless renewed by a new
//! request. Ctrl+C stops the generator, which lets the publisher drain and
//! exit gracefully.
#![warn(missing_docs)]
mod args;
mod generator;
mod subscriptions;

use crate::args::Args;
use crate::generator::{FeedEvent, RateGenerator};
use crate::subscriptions::SubscriptionBook;
use clap::Parser;
use forex_common::net;
use forex_common::wire;
use forex_common::FeedError;
use forex_common::Result;
use log::{error, info, warn};
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Spawns a background thread that decodes subscription datagrams from
/// `socket` and enrolls the requested delivery address in `book`.
///
/// Malformed datagrams are logged and ignored so one bad sender cannot take
/// the enrollment path down. The read timeout on the socket lets the thread
/// notice a shutdown request.
fn start_enrollment_listener(
    socket: Arc<UdpSocket>,
    book: Arc<Mutex<SubscriptionBook>>,
    shutdown: Arc<AtomicBool>,
) {
    thread::spawn(move || {
        let mut buf = [0u8; 64];
        while !shutdown.load(Ordering::Relaxed) {
            match socket.recv_from(&mut buf) {
                Ok((size, from)) => match wire::decode_subscription(&buf[..size]) {
                    Ok(delivery) => {
                        info!("subscription from {} for delivery to {}", from, delivery);
                        match book.lock() {
                            Ok(mut book) => book.enroll(delivery),
                            Err(e) => {
                                error!("subscription book lock poisoned: {}", e);
                                return;
                            }
                        }
                    }
                    Err(e) => warn!("ignoring datagram from {}: {}", from, e),
                },
                Err(e) => {
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut {
                        continue;
                    }
                    error!("enrollment receive error: {}", e);
                    return;
                }
            }
        }
    });
}

fn main() -> Result<(), FeedError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down provider...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .expect("Error setting Ctrl+C handler");
    }

    let socket = Arc::new(UdpSocket::bind(net::addr(&args.bind_ip, args.port))?);
    socket.set_read_timeout(Some(Duration::from_secs(1)))?;
    info!("provider socket bound on {}", socket.local_addr()?);

    let book = Arc::new(Mutex::new(SubscriptionBook::new(Duration::from_secs(
        args.subscription_secs,
    ))));
    start_enrollment_listener(Arc::clone(&socket), Arc::clone(&book), Arc::clone(&shutdown));

    let events = RateGenerator::start(
        Duration::from_millis(args.publish_interval_ms),
        Arc::clone(&shutdown),
    );

    loop {
        match events.recv() {
            Ok(FeedEvent::Quotes(batch)) => {
                let payload = wire::encode_message(&batch);
                let targets = {
                    let mut book = book.lock()?;
                    for addr in book.expire() {
                        info!("subscription expired for {}", addr);
                    }
                    book.active()
                };
                for addr in targets {
                    if let Err(e) = socket.send_to(&payload, addr) {
                        error!("Failed to send UDP packet to {}: {}", addr, e);
                    }
                }
            }
            Ok(FeedEvent::Shutdown) => break,
            Err(e) => return Err(FeedError::ChannelRecv(e.to_string())),
        }
    }
    info!("provider stopped");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
