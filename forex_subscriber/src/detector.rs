//! Negative-cycle detection over the rate graph.
//!
//! A sequence of conversions multiplies rates, so taking `-ln(rate)` as the
//! edge weight turns a profitable loop (product above 1) into a
//! negative-weight cycle. Bellman-Ford from the first registered currency
//! relaxes for |V|-1 rounds; any edge still relaxable afterwards sits on or
//! reaches a negative cycle, and the predecessor chain recovers a printable
//! conversion path for it.

use std::fmt;

use forex_common::currency::Currency;

use crate::graph::RateGraph;

/// A profitable conversion sequence, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Currencies in conversion order; the looping currency appears twice.
    pub path: Vec<Currency>,
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for currency in &self.path {
            if !first {
                f.write_str(" --> ")?;
            }
            write!(f, "{}", currency)?;
            first = false;
        }
        Ok(())
    }
}

/// Weight of one conversion step in log space.
///
/// Rates that are absent, non-finite or non-positive get `+INFINITY` so a
/// missing edge can never masquerade as infinite profit.
fn edge_weight(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        -rate.ln()
    } else {
        f64::INFINITY
    }
}

/// Runs Bellman-Ford over the graph and reports every arbitrage opportunity
/// found, one report per still-relaxable edge.
///
/// Overlapping and duplicate reports are preserved; downstream consumers see
/// exactly one report per offending edge. Graphs with at most one vertex, or
/// with no finite cross-currency edge, yield no reports.
pub fn find_arbitrage(graph: &RateGraph) -> Vec<Cycle> {
    let n = graph.len();
    if n <= 1 {
        return Vec::new();
    }

    let weights: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| edge_weight(graph.rate(i, j))).collect())
        .collect();

    let source = 0;
    let mut dist = vec![f64::INFINITY; n];
    let mut pre: Vec<Option<usize>> = vec![None; n];
    dist[source] = 0.0;

    for _ in 0..n - 1 {
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                if dist[i] + weights[i][j] < dist[j] {
                    dist[j] = dist[i] + weights[i][j];
                    pre[j] = Some(i);
                }
            }
        }
    }

    let mut cycles = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            if dist[i] + weights[i][j] < dist[j] {
                if let Some(cycle) = reconstruct(graph, &pre, i, j) {
                    cycles.push(cycle);
                }
            }
        }
    }
    cycles
}

/// Walks predecessor links backwards from the tail of a relaxable edge until
/// a vertex repeats, then renders the walk in conversion order.
///
/// Returns `None` if the predecessor chain breaks before closing a loop,
/// which abandons that one report.
fn reconstruct(graph: &RateGraph, pre: &[Option<usize>], i: usize, j: usize) -> Option<Cycle> {
    let mut walk = vec![j, i];
    let mut cursor = i;
    loop {
        let prev = pre[cursor]?;
        walk.push(prev);
        if walk[..walk.len() - 1].contains(&prev) {
            break;
        }
        cursor = prev;
    }
    walk.reverse();

    let currencies = graph.currencies();
    Some(Cycle {
        path: walk.into_iter().map(|v| currencies[v]).collect(),
    })
}
