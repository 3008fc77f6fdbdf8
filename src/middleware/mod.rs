//! Built-in middleware.
//!
//! Middleware are ordinary handlers registered with `use_middleware`. Each
//! constructor returns a closure ready to hand to a group.

mod logger;
mod tracing;

pub use self::logger::logger;
pub use self::tracing::request_span;
