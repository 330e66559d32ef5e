//! Quote payload carried by the price feed.
//!
//! A `Quote` is one exchange-rate observation: the provider's event time, the
//! ordered currency pair, and the rate. Quotes travel on the wire in the
//! fixed binary layout implemented in [`crate::wire`].
use std::fmt;

use chrono::{DateTime, Utc};

use crate::currency::CurrencyPair;

/// A single exchange-rate observation published by the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Provider-assigned event time, microsecond-precision UTC.
    pub timestamp: DateTime<Utc>,
    /// Ordered pair the rate applies to.
    pub pair: CurrencyPair,
    /// Units of `pair.quote` bought by one unit of `pair.base`. Positive by
    /// the provider's contract; the codec does not enforce it.
    pub rate: f64,
}

impl Quote {
    /// Creates a quote from its parts.
    pub fn new(timestamp: DateTime<Utc>, pair: CurrencyPair, rate: f64) -> Self {
        Quote {
            timestamp,
            pair,
            rate,
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.pair.base,
            self.pair.quote,
            self.rate
        )
    }
}
