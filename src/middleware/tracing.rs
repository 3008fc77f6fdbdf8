use tracing::info_span;

use crate::context::Context;

/// Run the rest of the chain inside a `request` span carrying the request id,
/// method and path, so every event logged downstream is correlated.
pub fn request_span() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |c: &mut Context| {
        let span = info_span!(
            "request",
            request_id = %c.request_id(),
            method = %c.method(),
            path = %c.path(),
        );
        let _guard = span.enter();
        c.next();
    }
}
