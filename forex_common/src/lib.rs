//!
//! Common types and utilities shared by the price provider and the subscriber.
//!
//! This crate aggregates:
//! - `error` — unified error type `FeedError` used across the workspace.
//! - `result` — handy `Result<T, FeedError>` alias.
//! - `currency` — currency codes and ordered base/quote pairs.
//! - `quote` — the exchange-rate observation payload.
//! - `wire` — the fixed binary layout for quote datagrams and subscriptions.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod currency;
pub mod quote;
pub mod wire;
pub mod net;

pub use currency::{Currency, CurrencyPair};
pub use error::FeedError;
pub use quote::Quote;
pub use result::Result;
