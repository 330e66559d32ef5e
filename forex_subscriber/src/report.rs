//! Delivery of detected arbitrage reports.
//!
//! Detection hands every cycle to an [`ArbitrageSink`]. The log sink is the
//! interactive default; the JSON Lines sink feeds downstream tooling one
//! object per report.

use std::io::Write;

use chrono::Utc;
use forex_common::result::Result;
use log::info;
use serde::Serialize;

use crate::detector::Cycle;

/// Consumer of detected arbitrage cycles.
pub trait ArbitrageSink {
    /// Delivers one detected cycle.
    fn publish(&mut self, cycle: &Cycle) -> Result<()>;
}

/// Renders reports through the logger.
pub struct LogSink;

impl ArbitrageSink for LogSink {
    fn publish(&mut self, cycle: &Cycle) -> Result<()> {
        info!("ARBITRAGE: {}", cycle);
        Ok(())
    }
}

#[derive(Serialize)]
struct CycleRecord {
    timestamp_micros: i64,
    path: Vec<String>,
}

/// Writes reports as JSON Lines into any writer, typically a file.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        JsonLinesSink { out }
    }
}

impl<W: Write> ArbitrageSink for JsonLinesSink<W> {
    fn publish(&mut self, cycle: &Cycle) -> Result<()> {
        let record = CycleRecord {
            timestamp_micros: Utc::now().timestamp_micros(),
            path: cycle.path.iter().map(|c| c.to_string()).collect(),
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.out.write_all(&line)?;
        Ok(())
    }
}
