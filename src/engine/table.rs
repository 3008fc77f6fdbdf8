use http::StatusCode;
use std::any::Any;
use std::io;
use std::net::ToSocketAddrs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

use super::group::GroupEntry;
use crate::context::{Context, HandlerFunc, HttpRequest, HttpResponse};
use crate::router::{parse_path, Router};
use crate::server::{serve, AppService, ServerHandle};
use crate::templates::HtmlTemplates;

/// Immutable routing table produced by [`Engine::seal`](super::Engine::seal).
///
/// `handle` takes `&self`, so one table behind an `Arc` serves every
/// connection coroutine without locking.
pub struct RouteTable {
    router: Router,
    groups: Vec<GroupEntry>,
    templates: Option<Arc<HtmlTemplates>>,
    not_found: HandlerFunc,
}

impl RouteTable {
    pub(crate) fn new(
        router: Router,
        groups: Vec<GroupEntry>,
        templates: Option<Arc<HtmlTemplates>>,
    ) -> Self {
        Self {
            router,
            groups,
            templates,
            not_found: Arc::new(not_found),
        }
    }

    /// Dispatch one request through its handler chain.
    ///
    /// The chain is the middleware of every group covering the path, in
    /// group-creation order, then the route handler or the 404 handler. A
    /// panic anywhere in the chain is contained and answered with a 500.
    #[must_use]
    pub fn handle(&self, request: HttpRequest) -> HttpResponse {
        let mut chain: Vec<HandlerFunc> = {
            let parts = parse_path(&request.path);
            self.groups
                .iter()
                .filter(|g| g.matches(&parts))
                .flat_map(|g| g.middlewares.iter().map(Arc::clone))
                .collect()
        };

        let mut ctx = Context::new(request);
        ctx.set_templates(self.templates.as_ref().map(Arc::clone));

        match self.router.get_route(ctx.method(), ctx.path()) {
            Some(matched) => {
                debug!(
                    request_id = %ctx.request_id(),
                    pattern = %matched.pattern,
                    params = matched.params.len(),
                    "Dispatching route"
                );
                chain.push(Arc::clone(matched.handler));
                ctx.set_params(matched.params);
            }
            None => {
                debug!(
                    request_id = %ctx.request_id(),
                    method = %ctx.method(),
                    path = %ctx.path(),
                    "No route matched"
                );
                chain.push(Arc::clone(&self.not_found));
            }
        }
        ctx.set_chain(chain);

        let request_id = ctx.request_id();
        let method = ctx.method().clone();
        let path = ctx.path().to_string();
        match catch_unwind(AssertUnwindSafe(move || {
            ctx.next();
            ctx
        })) {
            Ok(ctx) => ctx.into_response(),
            Err(panic) => {
                error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    panic = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                HttpResponse::plain(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "500 Internal Server Error\n",
                )
            }
        }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Registered `(method, pattern)` pairs.
    #[must_use]
    pub fn routes(&self) -> Vec<(http::Method, String)> {
        self.router.routes()
    }

    /// Serve this table on `addr` in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        serve(AppService::new(Arc::new(self)), addr)
    }
}

fn not_found(c: &mut Context) {
    let body = format!("404 NOT FOUND {}\n", c.path());
    c.string(StatusCode::NOT_FOUND, body);
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
