//! Binary wire layout shared by the provider and the subscriber.
//!
//! A published datagram is a sequence of fixed 32-byte records:
//!
//! | offset | field | encoding |
//! |--------|-------|----------|
//! | 0–7    | timestamp | unsigned 64-bit big-endian, microseconds since the UNIX epoch |
//! | 8–10   | base currency | 3 ASCII letters |
//! | 11–13  | quote currency | 3 ASCII letters |
//! | 14–21  | rate | IEEE-754 binary64, little-endian |
//! | 22–31  | reserved | ignored on decode, zeroed on encode |
//!
//! A subscription request is a single 6-byte frame: a 4-byte network-order
//! IPv4 address followed by a 2-byte big-endian port.
//!
//! Decoding is all-or-nothing per datagram: the first malformed field fails
//! the whole message and no partial quote list is produced.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::{DateTime, Utc};

use crate::currency::{Currency, CurrencyPair};
use crate::error::FeedError;
use crate::quote::Quote;
use crate::result::Result;

/// Length in bytes of one quote record.
pub const RECORD_LEN: usize = 32;

/// Length in bytes of a subscription request frame.
pub const SUBSCRIPTION_LEN: usize = 6;

/// Decodes an exchange rate. No range validation is applied; NaN and
/// infinities pass through untouched.
pub fn decode_price(bytes: [u8; 8]) -> f64 {
    f64::from_le_bytes(bytes)
}

/// Encodes an exchange rate. Round-trips with [`decode_price`] to full
/// precision.
pub fn encode_price(rate: f64) -> [u8; 8] {
    rate.to_le_bytes()
}

/// Decodes a wire timestamp. Values beyond the representable datetime range
/// are malformed.
pub fn decode_timestamp(bytes: [u8; 8]) -> Result<DateTime<Utc>> {
    let micros = u64::from_be_bytes(bytes);
    i64::try_from(micros)
        .ok()
        .and_then(DateTime::from_timestamp_micros)
        .ok_or_else(|| {
            FeedError::MalformedMessage(format!(
                "timestamp {} microseconds since epoch is not representable",
                micros
            ))
        })
}

/// Encodes a wire timestamp. The field is unsigned, so pre-epoch instants
/// clamp to zero.
pub fn encode_timestamp(timestamp: DateTime<Utc>) -> [u8; 8] {
    let micros = timestamp.timestamp_micros().max(0) as u64;
    micros.to_be_bytes()
}

/// Decodes one 32-byte record into a [`Quote`].
pub fn decode_record(record: &[u8; RECORD_LEN]) -> Result<Quote> {
    let mut ts = [0u8; 8];
    ts.copy_from_slice(&record[0..8]);
    let timestamp = decode_timestamp(ts)?;

    let mut base = [0u8; 3];
    base.copy_from_slice(&record[8..11]);
    let mut quote_ccy = [0u8; 3];
    quote_ccy.copy_from_slice(&record[11..14]);
    let pair = CurrencyPair::new(Currency::from_bytes(base)?, Currency::from_bytes(quote_ccy)?);

    let mut price = [0u8; 8];
    price.copy_from_slice(&record[14..22]);
    let rate = decode_price(price);

    Ok(Quote::new(timestamp, pair, rate))
}

/// Encodes a [`Quote`] into one 32-byte record with zeroed padding.
pub fn encode_record(quote: &Quote) -> [u8; RECORD_LEN] {
    let mut record = [0u8; RECORD_LEN];
    record[0..8].copy_from_slice(&encode_timestamp(quote.timestamp));
    record[8..11].copy_from_slice(&quote.pair.base.as_bytes());
    record[11..14].copy_from_slice(&quote.pair.quote.as_bytes());
    record[14..22].copy_from_slice(&encode_price(quote.rate));
    record
}

/// Decodes a published datagram into its quotes.
///
/// The payload length must be a multiple of [`RECORD_LEN`]. Decoding is
/// all-or-nothing: any malformed record fails the whole datagram. An empty
/// payload decodes to an empty list.
pub fn decode_message(payload: &[u8]) -> Result<Vec<Quote>> {
    if payload.len() % RECORD_LEN != 0 {
        return Err(FeedError::MalformedMessage(format!(
            "datagram length {} is not a multiple of {}",
            payload.len(),
            RECORD_LEN
        )));
    }

    let mut quotes = Vec::with_capacity(payload.len() / RECORD_LEN);
    for chunk in payload.chunks_exact(RECORD_LEN) {
        let mut record = [0u8; RECORD_LEN];
        record.copy_from_slice(chunk);
        quotes.push(decode_record(&record)?);
    }
    Ok(quotes)
}

/// Encodes quotes into one published datagram, records back to back.
pub fn encode_message(quotes: &[Quote]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(quotes.len() * RECORD_LEN);
    for quote in quotes {
        payload.extend_from_slice(&encode_record(quote));
    }
    payload
}

/// Encodes the address a subscriber wants quotes delivered to.
///
/// The frame only fits IPv4; IPv6 addresses are rejected.
pub fn encode_subscription(addr: &SocketAddr) -> Result<[u8; SUBSCRIPTION_LEN]> {
    match addr.ip() {
        IpAddr::V4(ip) => {
            let mut frame = [0u8; SUBSCRIPTION_LEN];
            frame[0..4].copy_from_slice(&ip.octets());
            frame[4..6].copy_from_slice(&addr.port().to_be_bytes());
            Ok(frame)
        }
        IpAddr::V6(ip) => Err(FeedError::UnsupportedAddress(format!(
            "cannot encode IPv6 address {} into a subscription frame",
            ip
        ))),
    }
}

/// Decodes a subscription request. The payload must be exactly
/// [`SUBSCRIPTION_LEN`] bytes.
pub fn decode_subscription(payload: &[u8]) -> Result<SocketAddr> {
    if payload.len() != SUBSCRIPTION_LEN {
        return Err(FeedError::MalformedMessage(format!(
            "subscription frame is {} bytes, expected {}",
            payload.len(),
            SUBSCRIPTION_LEN
        )));
    }
    let ip = Ipv4Addr::new(payload[0], payload[1], payload[2], payload[3]);
    let port = u16::from_be_bytes([payload[4], payload[5]]);
    Ok(SocketAddr::new(IpAddr::V4(ip), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn pair(base: &[u8; 3], quote: &[u8; 3]) -> CurrencyPair {
        CurrencyPair::new(
            Currency::from_bytes(*base).unwrap(),
            Currency::from_bytes(*quote).unwrap(),
        )
    }

    #[test]
    fn price_known_vector() {
        let bytes = [0x05, 0x04, 0x03, 0x02, 0x01, 0xff, 0x3f, 0x43];
        assert_eq!(decode_price(bytes), 9006104071832581.0);
        assert_eq!(encode_price(9006104071832581.0), bytes);
    }

    #[test]
    fn price_round_trips_to_full_precision() {
        for rate in [1.22041, 108.2755, 0.000001, 1.0 / 3.0, f64::MAX] {
            assert_eq!(decode_price(encode_price(rate)), rate);
        }
    }

    #[test]
    fn timestamp_known_vector() {
        let when = Utc.with_ymd_and_hms(1971, 12, 10, 1, 2, 3).unwrap()
            + TimeDelta::microseconds(64_000);
        let bytes = [0x00, 0x00, 0x37, 0xa3, 0x65, 0x8e, 0xf2, 0xc0];
        assert_eq!(encode_timestamp(when), bytes);
        assert_eq!(decode_timestamp(bytes).unwrap(), when);
    }

    #[test]
    fn timestamp_out_of_range_is_malformed() {
        let err = decode_timestamp([0xff; 8]).unwrap_err();
        assert!(matches!(err, FeedError::MalformedMessage(_)));
    }

    #[test]
    fn pre_epoch_timestamp_encodes_as_zero() {
        let when = Utc.with_ymd_and_hms(1969, 7, 20, 20, 17, 0).unwrap();
        assert_eq!(encode_timestamp(when), [0u8; 8]);
    }

    #[test]
    fn record_round_trips_and_ignores_padding() {
        let quote = Quote::new(
            Utc.with_ymd_and_hms(2006, 1, 2, 0, 0, 0).unwrap(),
            pair(b"GBP", b"USD"),
            1.22041,
        );
        let mut record = encode_record(&quote);
        assert_eq!(&record[22..32], &[0u8; 10]);

        record[22..32].copy_from_slice(&[0xab; 10]);
        assert_eq!(decode_record(&record).unwrap(), quote);
    }

    #[test]
    fn message_known_vector() {
        let mut message = Vec::new();
        message.extend_from_slice(&[0x00, 0x04, 0x09, 0x54, 0xdd, 0x35, 0x40, 0x00]);
        message.extend_from_slice(b"GBPUSD");
        message.extend_from_slice(&[0xbb, 0x61, 0xdb, 0xa2, 0xcc, 0x86, 0xf3, 0x3f]);
        message.extend_from_slice(&[0u8; 10]);
        message.extend_from_slice(&[0x00, 0x04, 0x09, 0x40, 0xbf, 0x5d, 0xe0, 0x00]);
        message.extend_from_slice(b"USDJPY");
        message.extend_from_slice(&[0x12, 0x83, 0xc0, 0xca, 0xa1, 0x11, 0x5b, 0x40]);
        message.extend_from_slice(&[0u8; 10]);

        let quotes = decode_message(&message).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(
            quotes[0].timestamp,
            Utc.with_ymd_and_hms(2006, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(quotes[0].pair, pair(b"GBP", b"USD"));
        assert_eq!(quotes[0].rate, 1.22041);
        assert_eq!(
            quotes[1].timestamp,
            Utc.with_ymd_and_hms(2006, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(quotes[1].pair, pair(b"USD", b"JPY"));
        assert_eq!(quotes[1].rate, 108.2755);

        assert_eq!(encode_message(&quotes), message);
    }

    #[test]
    fn message_length_must_be_multiple_of_record_len() {
        let err = decode_message(&[0u8; 33]).unwrap_err();
        assert!(matches!(err, FeedError::MalformedMessage(_)));
    }

    #[test]
    fn message_decoding_is_all_or_nothing() {
        let good = Quote::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            pair(b"EUR", b"USD"),
            1.0867,
        );
        let mut message = encode_message(&[good, good]);
        message[RECORD_LEN + 9] = b'7';

        let err = decode_message(&message).unwrap_err();
        assert!(matches!(err, FeedError::MalformedMessage(_)));
    }

    #[test]
    fn empty_message_decodes_to_no_quotes() {
        assert!(decode_message(&[]).unwrap().is_empty());
    }

    #[test]
    fn subscription_known_vector() {
        let addr: SocketAddr = "127.0.0.1:65534".parse().unwrap();
        let frame = encode_subscription(&addr).unwrap();
        assert_eq!(frame, [0x7f, 0x00, 0x00, 0x01, 0xff, 0xfe]);
        assert_eq!(decode_subscription(&frame).unwrap(), addr);
    }

    #[test]
    fn subscription_rejects_ipv6() {
        let addr: SocketAddr = "[::1]:10000".parse().unwrap();
        let err = encode_subscription(&addr).unwrap_err();
        assert!(matches!(err, FeedError::UnsupportedAddress(_)));
    }

    #[test]
    fn subscription_frame_length_is_fixed() {
        assert!(matches!(
            decode_subscription(&[0x7f, 0x00, 0x00, 0x01, 0xff]).unwrap_err(),
            FeedError::MalformedMessage(_)
        ));
        assert!(matches!(
            decode_subscription(&[0x7f, 0x00, 0x00, 0x01, 0xff, 0xfe, 0x00]).unwrap_err(),
            FeedError::MalformedMessage(_)
        ));
    }
}
