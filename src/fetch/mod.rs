// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Wire types exchanged with the remote fetch service
//!
//! A [`FetchRequest`] goes out as the single "Fetch" call on service
//! "urlfetch", and a [`FetchResponse`] comes back.

use std::fmt;

mod request;
mod response;
pub(crate) mod wire;

pub use request::{FetchRequest, HeaderEntry, RequestMethod};
pub use response::FetchResponse;

/// Service name of the remote fetch API
pub const SERVICE_NAME: &str = "urlfetch";

/// RPC method performing a fetch
pub const FETCH_METHOD: &str = "Fetch";

/// Application error codes reported by the fetch service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorCode {
    Ok,
    InvalidUrl,
    FetchError,
    UnspecifiedError,
    ResponseTooLarge,
    DeadlineExceeded,
    SslCertificateError,
    DnsError,
    Closed,
    InternalTransientError,
    TooManyRedirects,
    MalformedReply,
    ConnectionError,
    PayloadTooLarge,
    /// Code this crate does not know about, kept as sent
    Unknown(i32),
}

impl FetchErrorCode {
    /// Map a numeric code from the wire
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::InvalidUrl,
            2 => Self::FetchError,
            3 => Self::UnspecifiedError,
            4 => Self::ResponseTooLarge,
            5 => Self::DeadlineExceeded,
            6 => Self::SslCertificateError,
            7 => Self::DnsError,
            8 => Self::Closed,
            9 => Self::InternalTransientError,
            10 => Self::TooManyRedirects,
            11 => Self::MalformedReply,
            12 => Self::ConnectionError,
            13 => Self::PayloadTooLarge,
            other => Self::Unknown(other),
        }
    }

    /// Numeric code as sent on the wire
    pub fn code(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::InvalidUrl => 1,
            Self::FetchError => 2,
            Self::UnspecifiedError => 3,
            Self::ResponseTooLarge => 4,
            Self::DeadlineExceeded => 5,
            Self::SslCertificateError => 6,
            Self::DnsError => 7,
            Self::Closed => 8,
            Self::InternalTransientError => 9,
            Self::TooManyRedirects => 10,
            Self::MalformedReply => 11,
            Self::ConnectionError => 12,
            Self::PayloadTooLarge => 13,
            Self::Unknown(code) => *code,
        }
    }

    /// Whether the same fetch may succeed if issued again
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::InternalTransientError | Self::Closed | Self::ConnectionError
        )
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InvalidUrl => "INVALID_URL",
            Self::FetchError => "FETCH_ERROR",
            Self::UnspecifiedError => "UNSPECIFIED_ERROR",
            Self::ResponseTooLarge => "RESPONSE_TOO_LARGE",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::SslCertificateError => "SSL_CERTIFICATE_ERROR",
            Self::DnsError => "DNS_ERROR",
            Self::Closed => "CLOSED",
            Self::InternalTransientError => "INTERNAL_TRANSIENT_ERROR",
            Self::TooManyRedirects => "TOO_MANY_REDIRECTS",
            Self::MalformedReply => "MALFORMED_REPLY",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for FetchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "UNKNOWN({})", code),
            known => f.write_str(known.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(FetchErrorCode::from_code(5), FetchErrorCode::DeadlineExceeded);
        assert_eq!(FetchErrorCode::from_code(13).code(), 13);
        assert_eq!(FetchErrorCode::from_code(42), FetchErrorCode::Unknown(42));
        assert_eq!(FetchErrorCode::Unknown(42).code(), 42);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(FetchErrorCode::DnsError.to_string(), "DNS_ERROR");
        assert_eq!(FetchErrorCode::Unknown(99).to_string(), "UNKNOWN(99)");
    }
}
