//! # Router Module
//!
//! Path matching and route resolution for grove.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Splitting and validating registration patterns
//! - Storing one segment trie per HTTP method, with the handler on the terminal node
//! - Matching incoming request paths and extracting path parameters
//!
//! ## Pattern grammar
//!
//! Patterns are `/`-separated segments:
//!
//! - `docs` matches exactly `docs`
//! - `:lang` matches any single segment and binds it to `lang`
//! - `*filepath` must be last; it matches the remaining segments (at least one)
//!   and binds them joined with `/`
//!
//! Empty segments are dropped, so `//a/b/` and `/a/b` are the same path.
//!
//! ## Example
//!
//! ```rust
//! use grove::context::handler;
//! use grove::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router
//!     .add_route(Method::GET, "/p/:lang/doc", handler(|_| {}))
//!     .unwrap();
//!
//! let matched = router.get_route(&Method::GET, "/p/go/doc").unwrap();
//! assert_eq!(matched.pattern, "/p/:lang/doc");
//! assert_eq!(matched.params.get("lang"), Some("go"));
//! ```

mod core;
mod error;
mod pattern;
mod trie;

pub use core::{ParamVec, Params, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use error::RouteError;
pub use pattern::{parse_group_prefix, parse_path, parse_pattern, Segment};
