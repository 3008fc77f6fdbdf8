use http::header::CONTENT_LENGTH;
use may_minihttp::Response;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::error;

use crate::context::HttpResponse;

/// Default bound on distinct header lines kept alive for the wire encoder.
pub const DEFAULT_HEADER_LINE_LIMIT: usize = 4096;

static HEADER_LINE_LIMIT: AtomicUsize = AtomicUsize::new(DEFAULT_HEADER_LINE_LIMIT);

/// `may_minihttp` only accepts `&'static str` header lines. Lines are leaked
/// once and reused, so the set grows with distinct header values only.
static HEADER_LINES: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Set how many distinct `name: value` lines may be interned process-wide.
///
/// Once the limit is reached, responses carrying a header line not seen
/// before are sent without it. Raise it for applications that emit many
/// per-response values (`Location`, `ETag`, `Set-Cookie`).
pub fn set_header_line_limit(limit: usize) {
    HEADER_LINE_LIMIT.store(limit, Ordering::Relaxed);
}

#[must_use]
pub fn header_line_limit() -> usize {
    HEADER_LINE_LIMIT.load(Ordering::Relaxed)
}

fn intern_header_line(line: String) -> Option<&'static str> {
    let mut lines = HEADER_LINES
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    intern_in(&mut lines, line, header_line_limit())
}

fn intern_in(
    lines: &mut HashSet<&'static str>,
    line: String,
    limit: usize,
) -> Option<&'static str> {
    if let Some(existing) = lines.get(line.as_str()) {
        return Some(*existing);
    }
    if lines.len() >= limit {
        return None;
    }
    let leaked: &'static str = Box::leak(line.into_boxed_str());
    lines.insert(leaked);
    Some(leaked)
}

/// Write a completed response onto the wire response.
///
/// `Content-Length` is computed by the encoder and skipped here.
pub fn write_response(res: &mut Response, response: HttpResponse) {
    let reason = response.status.canonical_reason().unwrap_or("Unknown");
    res.status_code(usize::from(response.status.as_u16()), reason);
    for (name, value) in &response.headers {
        if *name == CONTENT_LENGTH {
            continue;
        }
        let line = format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        match intern_header_line(line) {
            Some(line) => {
                res.header(line);
            }
            None => error!(
                header = %name,
                limit = header_line_limit(),
                "Header line table full, dropping header; raise GROVE_HEADER_LINES"
            ),
        }
    }
    res.body_vec(response.body);
}
