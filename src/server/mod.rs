//! HTTP transport on `may_minihttp`: wire request parsing, response
//! encoding and the server handle.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{serve, ServerHandle, MAX_HEADERS, READY_TIMEOUT};
pub use request::parse_request;
pub use response::{
    header_line_limit, set_header_line_limit, write_response, DEFAULT_HEADER_LINE_LIMIT,
};
pub use service::AppService;
