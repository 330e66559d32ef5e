//! Error types shared between the provider and the subscriber.
//!
//! The `FeedError` enum unifies common failure cases for I/O, wire decoding,
//! serialization, and channel communication, allowing crates to propagate a
//! single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by provider and subscriber.
#[derive(Error, Debug)]
pub enum FeedError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A datagram (or one of its records) violated the fixed wire layout.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// A subscription address could not be encoded (only IPv4 fits the wire).
    #[error("Unsupported address: {0}")]
    UnsupportedAddress(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Crossbeam/channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for FeedError {
    fn from(err: PoisonError<T>) -> Self {
        FeedError::MutexLock(err.to_string())
    }
}
