//! Dense exchange-rate matrix over a first-seen currency registry.
//!
//! The table is the working set: ordered pair to rate, with currencies
//! registered in the order they were first seen. The graph is the dense
//! adjacency matrix derived from it, rebuilt from scratch after every store
//! mutation rather than patched in place.

use std::collections::HashMap;

use forex_common::currency::{Currency, CurrencyPair};
use forex_common::quote::Quote;

/// Exchange rates keyed by ordered pair, plus the currency registry.
pub struct RateTable {
    currencies: Vec<Currency>,
    known: HashMap<Currency, usize>,
    rates: HashMap<CurrencyPair, f64>,
}

impl RateTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        RateTable {
            currencies: Vec::new(),
            known: HashMap::new(),
            rates: HashMap::new(),
        }
    }

    /// Folds one quote into the table.
    ///
    /// Registers both currencies (first-seen order) and sets the quoted
    /// rate, its inverse, and both identity entries in one step, so none of
    /// the four can go stale independently.
    pub fn insert(&mut self, quote: &Quote) {
        let base = quote.pair.base;
        let counter = quote.pair.quote;
        self.register(base);
        self.register(counter);

        self.rates.insert(quote.pair, quote.rate);
        self.rates.insert(quote.pair.inverse(), 1.0 / quote.rate);
        self.rates.insert(CurrencyPair::new(base, base), 1.0);
        self.rates.insert(CurrencyPair::new(counter, counter), 1.0);
    }

    fn register(&mut self, currency: Currency) {
        if !self.known.contains_key(&currency) {
            self.known.insert(currency, self.currencies.len());
            self.currencies.push(currency);
        }
    }

    /// Registered currencies in first-seen order.
    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    /// The stored rate for an ordered pair, if any.
    pub fn rate(&self, pair: CurrencyPair) -> Option<f64> {
        self.rates.get(&pair).copied()
    }
}

/// Dense adjacency matrix of exchange rates.
///
/// `rate(i, j)` is how many units of currency `j` one unit of currency `i`
/// buys: the table rate where known, `1.0` on the diagonal, and
/// `f64::INFINITY` where no quote exists.
pub struct RateGraph {
    currencies: Vec<Currency>,
    matrix: Vec<Vec<f64>>,
}

impl RateGraph {
    /// Builds the full matrix for the table's registry.
    pub fn build(table: &RateTable) -> Self {
        let currencies = table.currencies().to_vec();
        let n = currencies.len();
        let mut matrix = vec![vec![f64::INFINITY; n]; n];

        for (i, &from) in currencies.iter().enumerate() {
            for (j, &to) in currencies.iter().enumerate() {
                if i == j {
                    matrix[i][j] = 1.0;
                } else if let Some(rate) = table.rate(CurrencyPair::new(from, to)) {
                    matrix[i][j] = rate;
                }
            }
        }

        RateGraph { currencies, matrix }
    }

    /// Vertices of the graph in registry order.
    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// The rate on edge `i -> j`.
    pub fn rate(&self, i: usize, j: usize) -> f64 {
        self.matrix[i][j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote(base: Currency, counter: Currency, rate: f64) -> Quote {
        Quote::new(Utc::now(), CurrencyPair::new(base, counter), rate)
    }

    #[test]
    fn insert_sets_rate_inverse_and_identities() {
        let mut table = RateTable::new();
        table.insert(&quote(Currency::GBP, Currency::USD, 2.0));

        assert_eq!(
            table.rate(CurrencyPair::new(Currency::GBP, Currency::USD)),
            Some(2.0)
        );
        assert_eq!(
            table.rate(CurrencyPair::new(Currency::USD, Currency::GBP)),
            Some(0.5)
        );
        assert_eq!(
            table.rate(CurrencyPair::new(Currency::GBP, Currency::GBP)),
            Some(1.0)
        );
        assert_eq!(
            table.rate(CurrencyPair::new(Currency::USD, Currency::USD)),
            Some(1.0)
        );
    }

    #[test]
    fn registry_keeps_first_seen_order() {
        let mut table = RateTable::new();
        table.insert(&quote(Currency::GBP, Currency::USD, 1.2));
        table.insert(&quote(Currency::USD, Currency::JPY, 108.0));
        table.insert(&quote(Currency::EUR, Currency::GBP, 0.89));

        assert_eq!(
            table.currencies(),
            &[Currency::GBP, Currency::USD, Currency::JPY, Currency::EUR]
        );
    }

    #[test]
    fn matrix_has_unit_diagonal_and_infinite_unknowns() {
        let mut table = RateTable::new();
        table.insert(&quote(Currency::GBP, Currency::USD, 1.2));
        table.insert(&quote(Currency::EUR, Currency::JPY, 118.0));
        let graph = RateGraph::build(&table);

        assert_eq!(graph.len(), 4);
        for i in 0..graph.len() {
            assert_eq!(graph.rate(i, i), 1.0);
        }
        // GBP and EUR never traded against each other.
        assert_eq!(graph.rate(0, 2), f64::INFINITY);
        assert_eq!(graph.rate(2, 0), f64::INFINITY);
        assert_eq!(graph.rate(0, 1), 1.2);
        assert_eq!(graph.rate(1, 0), 1.0 / 1.2);
    }

    #[test]
    fn empty_table_builds_empty_graph() {
        let graph = RateGraph::build(&RateTable::new());
        assert!(graph.is_empty());
    }
}
