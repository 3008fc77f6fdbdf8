use http::Method;
use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, warn};

use crate::context::{split_target, HttpRequest};

/// Convert a wire request into an [`HttpRequest`].
///
/// The path is percent-decoded and header names are lowercased; the body is read last because reading it
/// consumes the request. An unreadable body is treated as empty.
pub fn parse_request(req: Request) -> HttpRequest {
    let method = Method::from_bytes(req.method().as_bytes()).unwrap_or(Method::GET);
    let (path, query) = split_target(req.path());

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();
    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query_count = query.len(),
        "HTTP request parsed"
    );

    let mut body = Vec::new();
    if let Err(err) = req.body().read_to_end(&mut body) {
        warn!(path = %path, error = %err, "Failed to read request body");
        body.clear();
    } else if !body.is_empty() {
        debug!(body_size_bytes = body.len(), "Request body read");
    }

    HttpRequest {
        method,
        path,
        query,
        headers,
        body,
    }
}
