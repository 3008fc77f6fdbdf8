use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use std::borrow::Cow;

/// Completed response produced by a request chain.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded lossily as UTF-8.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Plain-text response, used for failures raised outside a handler.
    pub(crate) fn plain(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        Self {
            status,
            headers,
            body: body.into().into_bytes(),
        }
    }
}

/// Outcome of a header or status write on a [`ResponseWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    Applied,
    /// The status line was already written
    AfterStatus,
    /// Name or value is not a valid HTTP header
    Invalid,
}

/// Response sink owned by one request.
///
/// The status is write-once, and headers are frozen once it is written.
/// Writing body bytes without a status implies `200 OK`.
#[derive(Debug, Default)]
pub(crate) struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn write_header(&mut self, status: StatusCode) -> WriteOutcome {
        if self.status.is_some() {
            return WriteOutcome::AfterStatus;
        }
        self.status = Some(status);
        WriteOutcome::Applied
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> WriteOutcome {
        if self.status.is_some() {
            return WriteOutcome::AfterStatus;
        }
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
                WriteOutcome::Applied
            }
            _ => WriteOutcome::Invalid,
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    pub fn finish(self) -> HttpResponse {
        HttpResponse {
            status: self.status.unwrap_or(StatusCode::OK),
            headers: self.headers,
            body: self.body,
        }
    }
}
