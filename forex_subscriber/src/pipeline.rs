//! Ingestion pipeline: decode, refresh, admit, detect, publish.
//!
//! One datagram drives one pass: decode it whole, retire anything stale as
//! of the receive time, then feed the records through the store. Detection
//! is re-run synchronously after every store mutation (an admission or a
//! non-empty eviction sweep), so each published report reflects exactly the
//! rates on hand at that instant. An out-of-order record mutates nothing
//! and therefore re-runs nothing.

use chrono::{DateTime, Utc};
use forex_common::result::Result;
use forex_common::wire;
use log::{info, warn};

use crate::detector::find_arbitrage;
use crate::graph::RateGraph;
use crate::report::ArbitrageSink;
use crate::store::{Admission, QuoteStore};

/// Processes one received datagram end to end.
///
/// A malformed datagram surfaces as an error without touching the store;
/// the caller logs it and keeps listening.
pub fn process_datagram(
    store: &mut QuoteStore,
    payload: &[u8],
    now: DateTime<Utc>,
    sink: &mut dyn ArbitrageSink,
) -> Result<()> {
    let quotes = wire::decode_message(payload)?;

    if store.evict_stale(now) > 0 {
        scan(store, sink)?;
    }

    for quote in quotes {
        info!("{}", quote);
        match store.accept(quote) {
            Admission::Accepted => scan(store, sink)?,
            Admission::OutOfOrder => warn!("ignoring out-of-sequence quote {}", quote),
        }
    }
    Ok(())
}

/// Rebuilds the graph from the active table and publishes every detection.
fn scan(store: &QuoteStore, sink: &mut dyn ArbitrageSink) -> Result<()> {
    let table = store.active_rate_table();
    let graph = RateGraph::build(&table);
    for cycle in find_arbitrage(&graph) {
        sink.publish(&cycle)?;
    }
    Ok(())
}
