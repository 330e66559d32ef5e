//! Currency codes and ordered currency pairs.

use std::fmt;
use std::str::FromStr;

use crate::error::FeedError;
use crate::result::Result;

/// Three-letter ASCII currency code, e.g. `USD`.
///
/// Codes travel on the wire as raw bytes; construction checks that every
/// byte is an ASCII letter so downstream code can rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Currency([u8; 3]);

impl Currency {
    /// United States dollar.
    pub const USD: Currency = Currency(*b"USD");
    /// Euro.
    pub const EUR: Currency = Currency(*b"EUR");
    /// British pound sterling.
    pub const GBP: Currency = Currency(*b"GBP");
    /// Japanese yen.
    pub const JPY: Currency = Currency(*b"JPY");
    /// Swiss franc.
    pub const CHF: Currency = Currency(*b"CHF");
    /// Australian dollar.
    pub const AUD: Currency = Currency(*b"AUD");
    /// Canadian dollar.
    pub const CAD: Currency = Currency(*b"CAD");
    /// New Zealand dollar.
    pub const NZD: Currency = Currency(*b"NZD");

    /// Builds a currency from raw wire bytes. The bytes must be three ASCII
    /// letters; anything else is a malformed field.
    pub fn from_bytes(bytes: [u8; 3]) -> Result<Self> {
        if bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            Ok(Currency(bytes))
        } else {
            Err(FeedError::MalformedMessage(format!(
                "currency code {:?} is not three ASCII letters",
                bytes
            )))
        }
    }

    /// The raw bytes as they appear on the wire.
    pub fn as_bytes(&self) -> [u8; 3] {
        self.0
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes: [u8; 3] = s.as_bytes().try_into().map_err(|_| {
            FeedError::MalformedMessage(format!("currency code '{}' is not three letters", s))
        })?;
        Currency::from_bytes(bytes)
    }
}

/// Ordered base/quote pair.
///
/// Pairs are positional: `GBP/USD` and `USD/GBP` are distinct entries priced
/// independently, and nothing here canonicalizes one onto the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    /// Currency being priced.
    pub base: Currency,
    /// Currency the price is denominated in.
    pub quote: Currency,
}

impl CurrencyPair {
    /// Creates a pair in the given order.
    pub fn new(base: Currency, quote: Currency) -> Self {
        CurrencyPair { base, quote }
    }

    /// The same two currencies with the roles swapped.
    pub fn inverse(&self) -> Self {
        CurrencyPair {
            base: self.quote,
            quote: self.base,
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
