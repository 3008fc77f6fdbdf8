use std::time::Instant;

use tracing::info;

use crate::context::Context;

/// Access log: one `info` event per request, emitted after the rest of the
/// chain has run so the final status and latency are known.
pub fn logger() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |c: &mut Context| {
        let start = Instant::now();
        c.next();
        info!(
            request_id = %c.request_id(),
            method = %c.method(),
            uri = %c.request().uri(),
            status = c.status().as_u16(),
            latency_us = start.elapsed().as_micros() as u64,
            "Request completed"
        );
    }
}
