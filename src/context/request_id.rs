//! Per-request identifier.
//!
//! Clients and proxies may supply their own id in `X-Request-Id`; a value
//! that is not a ULID is ignored and a fresh one minted, so the id carried
//! on the `request` span and in access logs is always well formed.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use super::HttpRequest;

/// Inbound header whose ULID, when valid, becomes the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// ULID naming one request; sorts by creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(Ulid);

impl RequestId {
    /// Mint a new id from the current time.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Id supplied by the client, or a generated one.
    #[must_use]
    pub fn for_request(request: &HttpRequest) -> Self {
        request
            .header(REQUEST_ID_HEADER)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|err| de::Error::custom(format!("request id '{raw}': {err}")))
    }
}
