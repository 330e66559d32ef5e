//! Quote ledger with the freshness and ordering policy.
//!
//! The store is an append-only ledger of observations plus an index of the
//! current Active entry per ordered pair. Policy outcomes are explicit
//! status tags kept alongside each entry, so superseded and stale quotes
//! stay visible in the ledger instead of being erased, and the active set
//! can always be re-derived for graph construction.
//!
//! Ordering is per ordered pair: a quote strictly earlier than the pair's
//! current Active entry is rejected as out of order and never ledgered. A
//! re-quote with an equal timestamp supersedes.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use forex_common::currency::CurrencyPair;
use forex_common::quote::Quote;
use log::info;
use strum_macros::Display;

use crate::graph::RateTable;

/// Quotes older than this, measured against their embedded timestamp, are
/// retired from the active set.
pub const MAX_QUOTE_AGE: TimeDelta = TimeDelta::microseconds(1_500_000);

/// Lifecycle tag attached to each ledgered quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum QuoteStatus {
    /// Latest usable observation for its pair.
    Active,
    /// Replaced by a newer observation for the same pair.
    Superseded,
    /// Aged past the freshness horizon.
    Stale,
}

/// Outcome of offering a quote to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Admission {
    /// Ledgered as the new Active entry for its pair.
    Accepted,
    /// Strictly earlier than the pair's Active entry; not ledgered.
    OutOfOrder,
}

/// A ledgered observation together with its current status.
#[derive(Debug, Clone)]
pub struct StoredQuote {
    /// The observation as decoded from the wire.
    pub quote: Quote,
    /// Current lifecycle tag.
    pub status: QuoteStatus,
}

impl fmt::Display for StoredQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.quote)
    }
}

/// Per-status tally of the ledger.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    /// Entries currently feeding the rate graph.
    pub active: usize,
    /// Entries replaced by a newer quote.
    pub superseded: usize,
    /// Entries retired by age.
    pub stale: usize,
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "active={} superseded={} stale={}",
            self.active, self.superseded, self.stale
        )
    }
}

/// Append-only quote ledger with an index of the Active entry per pair.
pub struct QuoteStore {
    ledger: Vec<StoredQuote>,
    active: HashMap<CurrencyPair, usize>,
}

impl QuoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        QuoteStore {
            ledger: Vec::new(),
            active: HashMap::new(),
        }
    }

    /// Applies the ordering policy and ledgers the quote if admitted.
    ///
    /// A quote strictly earlier than the pair's current Active entry is
    /// `OutOfOrder` and leaves the store untouched. Otherwise the previous
    /// Active entry (if any) becomes `Superseded` and the new quote is
    /// appended as `Active`; equal timestamps supersede.
    pub fn accept(&mut self, quote: Quote) -> Admission {
        if let Some(&idx) = self.active.get(&quote.pair) {
            if quote.timestamp < self.ledger[idx].quote.timestamp {
                return Admission::OutOfOrder;
            }
            self.ledger[idx].status = QuoteStatus::Superseded;
        }
        self.ledger.push(StoredQuote {
            quote,
            status: QuoteStatus::Active,
        });
        self.active.insert(quote.pair, self.ledger.len() - 1);
        Admission::Accepted
    }

    /// Retires Active quotes whose embedded timestamp has aged at least
    /// [`MAX_QUOTE_AGE`] as of `now`. Returns how many were retired.
    ///
    /// The ledger is scanned in order, so eviction logs come out
    /// deterministically.
    pub fn evict_stale(&mut self, now: DateTime<Utc>) -> usize {
        let mut evicted = 0;
        for entry in self.ledger.iter_mut() {
            if entry.status != QuoteStatus::Active {
                continue;
            }
            if now.signed_duration_since(entry.quote.timestamp) >= MAX_QUOTE_AGE {
                entry.status = QuoteStatus::Stale;
                self.active.remove(&entry.quote.pair);
                info!("removing stale quote {}", entry.quote);
                evicted += 1;
            }
        }
        evicted
    }

    /// Snapshot of the Active entries as a rate table, registered in ledger
    /// (first-seen) order.
    pub fn active_rate_table(&self) -> RateTable {
        let mut table = RateTable::new();
        for entry in &self.ledger {
            if entry.status == QuoteStatus::Active {
                table.insert(&entry.quote);
            }
        }
        table
    }

    /// Every ledgered observation with its current tag, in arrival order.
    pub fn entries(&self) -> &[StoredQuote] {
        &self.ledger
    }

    /// Tally of the ledger by status.
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in &self.ledger {
            match entry.status {
                QuoteStatus::Active => counts.active += 1,
                QuoteStatus::Superseded => counts.superseded += 1,
                QuoteStatus::Stale => counts.stale += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use forex_common::currency::{Currency, CurrencyPair};

    fn ts(micros: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(micros).unwrap()
    }

    fn gbp_usd(micros: i64, rate: f64) -> Quote {
        Quote::new(
            ts(micros),
            CurrencyPair::new(Currency::GBP, Currency::USD),
            rate,
        )
    }

    #[test]
    fn increasing_timestamps_are_always_accepted() {
        let mut store = QuoteStore::new();
        for micros in [1, 2, 3, 100, 5_000_000] {
            assert_eq!(store.accept(gbp_usd(micros, 1.2)), Admission::Accepted);
        }
        let counts = store.status_counts();
        assert_eq!(counts.active, 1);
        assert_eq!(counts.superseded, 4);
    }

    #[test]
    fn earlier_quote_is_out_of_order_and_not_ledgered() {
        let mut store = QuoteStore::new();
        assert_eq!(store.accept(gbp_usd(10, 1.5)), Admission::Accepted);
        assert_eq!(store.accept(gbp_usd(5, 9.9)), Admission::OutOfOrder);

        assert_eq!(store.entries().len(), 1);
        let table = store.active_rate_table();
        let pair = CurrencyPair::new(Currency::GBP, Currency::USD);
        assert_eq!(table.rate(pair), Some(1.5));
    }

    #[test]
    fn equal_timestamp_requote_supersedes() {
        let mut store = QuoteStore::new();
        store.accept(gbp_usd(10, 1.5));
        assert_eq!(store.accept(gbp_usd(10, 1.6)), Admission::Accepted);

        let pair = CurrencyPair::new(Currency::GBP, Currency::USD);
        assert_eq!(store.active_rate_table().rate(pair), Some(1.6));
        assert_eq!(store.entries()[0].status, QuoteStatus::Superseded);
        assert_eq!(store.entries()[1].status, QuoteStatus::Active);
    }

    #[test]
    fn ordering_is_per_ordered_pair() {
        let mut store = QuoteStore::new();
        store.accept(gbp_usd(10, 1.5));

        // The inverse pair is a separate instrument with its own clock.
        let usd_gbp = Quote::new(
            ts(5),
            CurrencyPair::new(Currency::USD, Currency::GBP),
            0.66,
        );
        assert_eq!(store.accept(usd_gbp), Admission::Accepted);
    }

    #[test]
    fn eviction_threshold_is_inclusive() {
        let mut store = QuoteStore::new();
        store.accept(gbp_usd(0, 1.2));

        let just_under = ts(0) + MAX_QUOTE_AGE - TimeDelta::microseconds(1);
        assert_eq!(store.evict_stale(just_under), 0);
        assert_eq!(store.status_counts().active, 1);

        let exactly = ts(0) + MAX_QUOTE_AGE;
        assert_eq!(store.evict_stale(exactly), 1);
        let counts = store.status_counts();
        assert_eq!(counts.active, 0);
        assert_eq!(counts.stale, 1);
    }

    #[test]
    fn stale_pair_accepts_fresh_quotes_again() {
        let mut store = QuoteStore::new();
        store.accept(gbp_usd(0, 1.2));
        store.evict_stale(ts(2_000_000));

        // An earlier timestamp is fine once no Active entry remains.
        assert_eq!(store.accept(gbp_usd(1, 1.3)), Admission::Accepted);
        let counts = store.status_counts();
        assert_eq!(counts.active, 1);
        assert_eq!(counts.stale, 1);
    }

    #[test]
    fn ledger_keeps_history_with_tags() {
        let mut store = QuoteStore::new();
        store.accept(gbp_usd(1, 1.2));
        store.accept(gbp_usd(2, 1.3));
        store.evict_stale(ts(5_000_000));

        let tags: Vec<QuoteStatus> = store.entries().iter().map(|e| e.status).collect();
        assert_eq!(tags, vec![QuoteStatus::Superseded, QuoteStatus::Stale]);
        assert!(store.entries()[0].to_string().starts_with("[Superseded]"));
    }
}
