//! Synthetic rate stream generation.
//!
//! The `RateGenerator` runs a background thread that perturbs a fixed
//! catalog of major currency pairs with a small random walk and hands each
//! batch to the publisher over a `crossbeam_channel`.
//!
//! Event model:
//! - `FeedEvent::Quotes(batch)` — one freshly timestamped quote per catalog
//!   pair.
//! - `FeedEvent::Shutdown` — signal for the publisher to terminate
//!   gracefully.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{unbounded, Receiver};
use forex_common::currency::{Currency, CurrencyPair};
use forex_common::quote::Quote;
use log::info;
use rand::Rng;

/// Message sent by the generator to the publisher.
pub enum FeedEvent {
    /// New batch of quotes, one per catalog pair.
    Quotes(Vec<Quote>),
    /// Generator is done; no more batches will follow.
    Shutdown,
}

/// Pairs the provider prices, with their starting rates.
const CATALOG: [(Currency, Currency, f64); 8] = [
    (Currency::GBP, Currency::USD, 1.22041),
    (Currency::USD, Currency::JPY, 108.2755),
    (Currency::EUR, Currency::USD, 1.0867),
    (Currency::USD, Currency::CHF, 0.9134),
    (Currency::AUD, Currency::USD, 0.6841),
    (Currency::USD, Currency::CAD, 1.3701),
    (Currency::NZD, Currency::USD, 0.6214),
    (Currency::EUR, Currency::GBP, 0.8901),
];

/// Background synthetic market data generator.
pub struct RateGenerator;

impl RateGenerator {
    /// Starts the generator thread and returns the event stream.
    ///
    /// Every `interval` the thread advances each catalog rate by a ±1%
    /// random walk and emits the batch with fresh timestamps. Once the
    /// shutdown flag is observed (or the receiver is dropped) it sends a
    /// final `Shutdown` event and exits.
    pub fn start(interval: Duration, shutdown: Arc<AtomicBool>) -> Receiver<FeedEvent> {
        let (tx, rx) = unbounded::<FeedEvent>();

        thread::spawn(move || {
            let mut rates: Vec<(CurrencyPair, f64)> = CATALOG
                .iter()
                .map(|&(base, counter, rate)| (CurrencyPair::new(base, counter), rate))
                .collect();
            info!("rate generator started ({} pairs)", rates.len());

            while !shutdown.load(Ordering::Relaxed) {
                let now = Utc::now();
                let mut batch = Vec::with_capacity(rates.len());
                for (pair, rate) in rates.iter_mut() {
                    *rate = next_rate(*rate);
                    batch.push(Quote::new(now, *pair, *rate));
                }
                if tx.send(FeedEvent::Quotes(batch)).is_err() {
                    return;
                }
                thread::sleep(interval);
            }
            let _ = tx.send(FeedEvent::Shutdown);
        });
        rx
    }
}

/// Advances a rate by a random walk sampled uniformly from `[-1%, +1%)`,
/// clamped to stay positive.
fn next_rate(current: f64) -> f64 {
    let mut rng = rand::rng();
    let change: f64 = rng.random_range(-0.01..0.01);
    (current * (1.0 + change)).max(1e-6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_walk_never_goes_non_positive() {
        let mut rate = 1e-6;
        for _ in 0..10_000 {
            rate = next_rate(rate);
            assert!(rate > 0.0);
        }
    }

    #[test]
    fn batches_cover_the_catalog_with_positive_rates() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let rx = RateGenerator::start(Duration::from_millis(1), shutdown.clone());

        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        shutdown.store(true, Ordering::SeqCst);

        match event {
            FeedEvent::Quotes(batch) => {
                assert_eq!(batch.len(), CATALOG.len());
                for (quote, &(base, counter, _)) in batch.iter().zip(CATALOG.iter()) {
                    assert_eq!(quote.pair, CurrencyPair::new(base, counter));
                    assert!(quote.rate > 0.0);
                }
            }
            FeedEvent::Shutdown => panic!("feed shut down before the first batch"),
        }
    }

    #[test]
    fn shutdown_flag_ends_the_stream() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let rx = RateGenerator::start(Duration::from_millis(1), shutdown.clone());
        shutdown.store(true, Ordering::SeqCst);

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(FeedEvent::Shutdown) => break,
                Ok(FeedEvent::Quotes(_)) => {
                    assert!(
                        std::time::Instant::now() < deadline,
                        "generator kept producing after shutdown"
                    );
                }
                Err(e) => panic!("stream ended without a shutdown event: {}", e),
            }
        }
    }
}
