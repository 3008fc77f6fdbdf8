//! # Context Module
//!
//! Per-request state handed to every handler in the chain.
//!
//! A [`Context`] is created for each request, owned by the coroutine serving
//! that request, and dropped once the chain completes. It carries:
//!
//! - the request (method, path, query, form values, headers, body)
//! - the path parameters extracted by the router
//! - the ordered handler chain and the continuation cursor (see [`chain`])
//! - the response being written (write-once status, headers, body)
//!
//! ## Example
//!
//! ```rust
//! use grove::context::{handler, HandlerFunc};
//! use http::StatusCode;
//!
//! let hello: HandlerFunc = handler(|c| {
//!     let name = c.query("name").unwrap_or("stranger").to_string();
//!     c.string(StatusCode::OK, format!("hello {name}, you're at {}\n", c.path()));
//! });
//! ```

pub mod chain;
mod request;
mod request_id;
mod writer;

pub use chain::ChainError;
pub use request::{decode_path, parse_urlencoded, HttpRequest};
pub(crate) use request::split_target;
pub use request_id::{RequestId, REQUEST_ID_HEADER};
pub use writer::HttpResponse;

use http::{Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use crate::router::Params;
use crate::templates::HtmlTemplates;
use writer::{ResponseWriter, WriteOutcome};

/// A request handler or middleware.
///
/// All effects go through the [`Context`]; middleware call [`Context::next`]
/// to run the rest of the chain.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Wrap a closure as a [`HandlerFunc`].
pub fn handler<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Per-request state.
pub struct Context {
    request: HttpRequest,
    request_id: RequestId,
    params: Params,
    handlers: Vec<HandlerFunc>,
    /// Position of the next handler to start
    cursor: usize,
    /// Position of the innermost handler currently running
    running: Option<usize>,
    /// Whether the engine (slot 0) or handler i (slot i + 1) has continued
    continued: Vec<bool>,
    writer: ResponseWriter,
    templates: Option<Arc<HtmlTemplates>>,
}

impl Context {
    /// Create a context with an empty chain.
    ///
    /// The request id is taken from a valid `X-Request-Id` header or generated.
    pub fn new(request: HttpRequest) -> Self {
        let request_id = RequestId::for_request(&request);
        Self {
            request,
            request_id,
            params: Params::new(),
            handlers: Vec::new(),
            cursor: 0,
            running: None,
            continued: vec![false],
            writer: ResponseWriter::default(),
            templates: None,
        }
    }

    pub(crate) fn set_chain(&mut self, handlers: Vec<HandlerFunc>) {
        self.continued = vec![false; handlers.len() + 1];
        self.handlers = handlers;
        self.cursor = 0;
        self.running = None;
    }

    pub(crate) fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    pub(crate) fn set_templates(&mut self, templates: Option<Arc<HtmlTemplates>>) {
        self.templates = templates;
    }

    /// Finish the request, yielding the response written so far.
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        self.writer.finish()
    }

    // ---- request side -------------------------------------------------

    #[must_use]
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.request.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Path parameter bound by `:name` or `*name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// First query-string value for `key`.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.request.query_value(key)
    }

    /// Form value for `key`, from an urlencoded body or else the query string.
    #[must_use]
    pub fn post_form(&self, key: &str) -> Option<String> {
        self.request.form_value(key)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.request.body
    }

    // ---- response side ------------------------------------------------

    /// Status written so far, `200 OK` if none has been.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.writer.status().unwrap_or(StatusCode::OK)
    }

    #[must_use]
    pub fn status_written(&self) -> bool {
        self.writer.status().is_some()
    }

    /// Write the status line. Only the first call takes effect.
    pub fn set_status(&mut self, code: StatusCode) {
        if self.writer.write_header(code) == WriteOutcome::AfterStatus {
            warn!(
                request_id = %self.request_id,
                status = code.as_u16(),
                current = self.status().as_u16(),
                "Status already written, ignoring"
            );
        }
    }

    /// Set a response header. Ignored once the status is written.
    ///
    /// The server keeps a bounded process-wide table of distinct
    /// `name: value` lines (`GROVE_HEADER_LINES`, default 4096). A line not
    /// seen before is dropped from the wire once the table is full, so
    /// per-response values such as `ETag` or `Set-Cookie` need a larger limit
    /// on long-running servers.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self.writer.set_header(name, value) {
            WriteOutcome::Applied => {}
            WriteOutcome::AfterStatus => warn!(
                request_id = %self.request_id,
                header = %name,
                "Header set after status was written, ignoring"
            ),
            WriteOutcome::Invalid => warn!(
                request_id = %self.request_id,
                header = %name,
                "Invalid response header, ignoring"
            ),
        }
    }

    /// Append raw bytes to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.writer.write(bytes);
    }

    /// Plain-text body.
    pub fn string(&mut self, code: StatusCode, body: impl AsRef<str>) {
        self.set_header("Content-Type", "text/plain");
        self.set_status(code);
        self.writer.write(body.as_ref().as_bytes());
    }

    /// JSON body. A serialization failure becomes a 500 carrying the error text.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, obj: &T) {
        match serde_json::to_vec(obj) {
            Ok(bytes) => {
                self.set_header("Content-Type", "application/json");
                self.set_status(code);
                self.writer.write(&bytes);
            }
            Err(err) => {
                error!(
                    request_id = %self.request_id,
                    path = %self.request.path,
                    error = %err,
                    "JSON serialization failed"
                );
                self.string(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
            }
        }
    }

    /// Raw bytes with no content type.
    pub fn data(&mut self, code: StatusCode, data: impl AsRef<[u8]>) {
        self.set_status(code);
        self.writer.write(data.as_ref());
    }

    /// Inline HTML body.
    pub fn html(&mut self, code: StatusCode, html: impl AsRef<str>) {
        self.set_header("Content-Type", "text/html");
        self.set_status(code);
        self.writer.write(html.as_ref().as_bytes());
    }

    /// Render a template loaded with `Engine::load_html_glob`.
    ///
    /// Missing templates or render failures become a 500 with the error text.
    pub fn html_template<T: Serialize>(&mut self, code: StatusCode, name: &str, data: &T) {
        let rendered = match &self.templates {
            Some(templates) => templates.render(name, data).map_err(|e| e.to_string()),
            None => Err("no HTML templates loaded".to_string()),
        };
        match rendered {
            Ok(html) => self.html(code, html),
            Err(err) => {
                error!(
                    request_id = %self.request_id,
                    template = %name,
                    error = %err,
                    "Template render failed"
                );
                self.string(StatusCode::INTERNAL_SERVER_ERROR, err);
            }
        }
    }
}
