//! MIME types for carrying the messages over HTTP.

use crate::messages::{Payment, PaymentAck, PaymentRequest, WireMessage};

/// Media type of an encoded `PaymentRequest`.
pub const PAYMENT_REQUEST: &str = "application/bitcoin-paymentrequest";
/// Media type of an encoded `Payment`.
pub const PAYMENT: &str = "application/bitcoin-payment";
/// Media type of an encoded `PaymentACK`.
pub const PAYMENT_ACK: &str = "application/bitcoin-paymentack";

/// A message with a registered MIME type.
pub trait ContentType: WireMessage {
    const CONTENT_TYPE: &'static str;
}

impl ContentType for PaymentRequest {
    const CONTENT_TYPE: &'static str = PAYMENT_REQUEST;
}

impl ContentType for Payment {
    const CONTENT_TYPE: &'static str = PAYMENT;
}

impl ContentType for PaymentAck {
    const CONTENT_TYPE: &'static str = PAYMENT_ACK;
}

/// Whether a `Content-Type` header value names `M`'s MIME type.
///
/// Parameters after `;` are ignored and the comparison is case-insensitive.
pub fn matches<M: ContentType>(header: &str) -> bool {
    let essence = header.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(M::CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        assert!(matches::<PaymentRequest>("application/bitcoin-paymentrequest"));
        assert!(matches::<Payment>("Application/Bitcoin-Payment; charset=binary"));
        assert!(!matches::<Payment>("application/bitcoin-paymentack"));
        assert!(!matches::<PaymentAck>(""));
    }
}
