//! # grove
//!
//! **grove** is a small HTTP routing and middleware-composition engine on the
//! `may` coroutine runtime.
//!
//! ## Overview
//!
//! Applications register handlers against method + path patterns with named
//! parameters (`/p/:lang/doc`) and catch-alls (`/static/*filepath`), organize
//! routes into nested groups that share a prefix and a middleware list, and
//! serve them through a single request entry point. Each request gets a
//! [`Context`](context::Context) carrying the request, extracted parameters
//! and a response writer; handlers and middleware form a chain driven by
//! explicit continuation ([`Context::next`](context::Context::next)).
//!
//! ## Architecture
//!
//! - **[`router`]** - pattern parsing and the per-method segment trie
//! - **[`context`]** - per-request state, response emitters and the chain driver
//! - **[`engine`]** - registration API (engine, groups) and the sealed [`RouteTable`]
//! - **[`middleware`]** - built-in access log and request span
//! - **[`server`]** - `may_minihttp` transport
//! - **[`static_files`]** / **[`templates`]** - file serving and HTML rendering
//! - **[`config`]**, **[`runtime_config`]**, **[`logging`]** - startup configuration
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as server::AppService
//!     participant Table as engine::RouteTable
//!     participant Router as router::Router
//!     participant Chain as context::Context
//!
//!     Client->>Server: HTTP request
//!     Server->>Server: parse_request
//!     Server->>Table: handle(HttpRequest)
//!     Table->>Table: collect middleware of covering groups
//!     Table->>Router: get_route(method, path)
//!     Router-->>Table: handler + params (or none → 404 handler)
//!     Table->>Chain: next()
//!     Chain->>Chain: middleware ... route handler
//!     Chain-->>Table: HttpResponse
//!     Table-->>Server: HttpResponse
//!     Server-->>Client: status, headers, body
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grove::engine::Engine;
//! use http::StatusCode;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut engine = Engine::new();
//!     engine.get("/", |c| c.html(StatusCode::OK, "<h1>Hello grove</h1>"))?;
//!     engine.get("/hello", |c| {
//!         let name = c.query("name").unwrap_or_default().to_string();
//!         c.string(StatusCode::OK, format!("hello {name}, you're at {}\n", c.path()));
//!     })?;
//!
//!     let mut v1 = engine.group("/v1")?;
//!     v1.use_middleware(grove::middleware::logger());
//!     v1.get("/hello/:name", |c| {
//!         let name = c.param("name").unwrap_or_default().to_string();
//!         c.string(StatusCode::OK, format!("hello {name}\n"));
//!     })?;
//!
//!     engine.run("0.0.0.0:9999")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Runtime Considerations
//!
//! Each connection is served by a `may` coroutine with a fixed stack
//! (`GROVE_STACK_SIZE`, 16 KB by default). Handlers should avoid deep
//! recursion and large stack buffers. A panicking handler is contained to
//! its request and answered with a 500.

pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;
pub mod templates;

pub use context::{
    handler, ChainError, Context, HandlerFunc, HttpRequest, HttpResponse, RequestId,
};
pub use engine::{Engine, RouteTable, RouterGroup};
pub use router::{RouteError, Router};
