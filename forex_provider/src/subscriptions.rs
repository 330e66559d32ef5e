//! Subscription bookkeeping for the provider.
//!
//! The book tracks every delivery address that sent a subscription request
//! and when it last did so. A subscription lives for a fixed TTL; sending a
//! new request renews it. Expiry is detected by a sweep over the book, so
//! the publisher can log exactly which subscribers fell off.
//!
//! Time is measured with `std::time::Instant`, which is monotonic and
//! immune to system clock changes. The book itself is not synchronized; the
//! enrollment listener and the publisher share it behind a `Mutex`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Tracks subscriber delivery addresses and their renewal deadlines.
pub struct SubscriptionBook {
    subscribers: HashMap<SocketAddr, Instant>,
    ttl: Duration,
}

impl SubscriptionBook {
    /// Creates an empty book with the given subscription lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            subscribers: HashMap::new(),
            ttl,
        }
    }

    /// Enrolls a delivery address, or renews it if already present.
    pub fn enroll(&mut self, addr: SocketAddr) {
        self.subscribers.insert(addr, Instant::now());
    }

    /// Sweeps the book and removes every subscription past its TTL.
    /// Returns the removed addresses.
    pub fn expire(&mut self) -> Vec<SocketAddr> {
        let now = Instant::now();
        let ttl = self.ttl;
        let mut expired = Vec::new();

        self.subscribers.retain(|addr, enrolled_at| {
            if now.duration_since(*enrolled_at) > ttl {
                expired.push(*addr);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Current delivery addresses.
    pub fn active(&self) -> Vec<SocketAddr> {
        self.subscribers.keys().copied().collect()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
