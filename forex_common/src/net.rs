//! Shared networking constants and helpers used by provider and subscriber.

/// UDP port the price provider listens on for subscription requests.
pub const PROVIDER_PORT: u16 = 50403;
/// UDP port the subscriber binds by default to receive quote datagrams.
pub const SUBSCRIBER_PORT: u16 = 10000;
/// Receive buffer size for quote datagrams.
pub const BUF_SZ: usize = 4096;

/// Helper to format an IPv4 address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}
