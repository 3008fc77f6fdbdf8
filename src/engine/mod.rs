//! # Engine Module
//!
//! Registration-time API: the [`Engine`], its root group and nested
//! [`RouterGroup`]s.
//!
//! Routes and middleware are registered on a mutable `Engine`. Once
//! registration is done, [`Engine::seal`] freezes everything into an
//! immutable [`RouteTable`] that is shared by all serving coroutines. There
//! is no way to register on a table, so the route set cannot change while
//! requests are in flight.
//!
//! ## Groups
//!
//! Every group has an absolute prefix (its ancestors' prefixes concatenated
//! with its own) and its own middleware list. For each request, the
//! middleware of every group whose prefix covers the path runs first, in
//! group-creation order, followed by the route handler:
//!
//! ```rust
//! use grove::engine::Engine;
//! use http::StatusCode;
//!
//! let mut engine = Engine::new();
//! engine.use_middleware(grove::middleware::logger());
//! engine.get("/", |c| c.html(StatusCode::OK, "<h1>Hello</h1>")).unwrap();
//!
//! let mut v1 = engine.group("/v1").unwrap();
//! v1.get("/hello/:name", |c| {
//!     let name = c.param("name").unwrap_or_default().to_string();
//!     c.string(StatusCode::OK, format!("hello {name}\n"));
//! })
//! .unwrap();
//!
//! let table = engine.seal();
//! assert_eq!(table.routes().len(), 2);
//! ```

mod group;
mod table;

pub use table::RouteTable;

use http::{Method, StatusCode};
use std::io;
use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::{Context, HandlerFunc};
use crate::router::{parse_group_prefix, RouteError, Router};
use crate::static_files::StaticFiles;
use crate::templates::HtmlTemplates;
use group::GroupEntry;

/// Application builder: the route trie, the group list and the templates.
///
/// The engine is itself the root group (empty prefix); the group methods on
/// `Engine` forward to it.
pub struct Engine {
    router: Router,
    /// Index 0 is the root group
    groups: Vec<GroupEntry>,
    templates: Option<HtmlTemplates>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![GroupEntry::root()],
            templates: None,
        }
    }

    /// The root group.
    pub fn root(&mut self) -> RouterGroup<'_> {
        RouterGroup {
            engine: self,
            index: 0,
        }
    }

    /// Create a top-level group.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidGroupPrefix`] unless `prefix` is empty or a
    /// `/`-led literal path.
    pub fn group(&mut self, prefix: &str) -> Result<RouterGroup<'_>, RouteError> {
        let index = self.new_group(0, prefix)?;
        Ok(RouterGroup {
            engine: self,
            index,
        })
    }

    /// Append middleware to the root group; it runs for every request.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.groups[0].middlewares.push(Arc::new(middleware));
        self
    }

    /// Register `handler` for `method` on `pattern`.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] from pattern validation; the engine is unchanged.
    pub fn add_route<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.register(0, method, pattern, Arc::new(handler))
    }

    /// # Errors
    ///
    /// See [`Engine::add_route`].
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::GET, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`Engine::add_route`].
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::POST, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`Engine::add_route`].
    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::PUT, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`Engine::add_route`].
    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::PATCH, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`Engine::add_route`].
    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::DELETE, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`Engine::add_route`].
    pub fn head<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::HEAD, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`Engine::add_route`].
    pub fn options<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::OPTIONS, pattern, handler)
    }

    /// Serve files under `root` at `relative/*filepath` on the root group.
    ///
    /// # Errors
    ///
    /// See [`RouterGroup::static_files`].
    pub fn static_files<P: Into<PathBuf>>(&mut self, relative: &str, root: P) -> Result<(), RouteError> {
        self.root().static_files(relative, root)
    }

    /// Load HTML templates matching `pattern` for [`Context::html_template`].
    ///
    /// May be called more than once; later templates with the same name
    /// replace earlier ones.
    ///
    /// # Errors
    ///
    /// Fails if the glob is malformed, matches nothing, or a template does
    /// not parse.
    pub fn load_html_glob(&mut self, pattern: &str) -> anyhow::Result<()> {
        self.templates_mut().load_glob(pattern)?;
        Ok(())
    }

    /// Template set, created empty on first access.
    pub fn templates_mut(&mut self) -> &mut HtmlTemplates {
        self.templates.get_or_insert_with(HtmlTemplates::new)
    }

    /// The routing trie built so far.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Freeze registration into an immutable, shareable routing table.
    #[must_use]
    pub fn seal(self) -> RouteTable {
        info!(
            routes = self.router.routes().len(),
            groups = self.groups.len(),
            templates = self.templates.as_ref().map_or(0, |t| t.names().len()),
            "Routing table sealed"
        );
        RouteTable::new(self.router, self.groups, self.templates.map(Arc::new))
    }

    /// Seal and serve on `addr`, blocking until the server stops.
    ///
    /// # Errors
    ///
    /// Returns bind errors, or an error if the server coroutine panicked.
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> io::Result<()> {
        let handle = self.seal().start(addr)?;
        handle
            .join()
            .map_err(|_| io::Error::other("server coroutine panicked"))
    }

    fn new_group(&mut self, parent: usize, prefix: &str) -> Result<usize, RouteError> {
        let full = format!("{}{}", self.groups[parent].prefix, prefix);
        let segments = parse_group_prefix(&full)?;
        self.groups.push(GroupEntry::new(full, segments));
        let index = self.groups.len() - 1;
        debug!(prefix = %self.groups[index].prefix, index, "Group created");
        Ok(index)
    }

    fn register(
        &mut self,
        group: usize,
        method: Method,
        pattern: &str,
        handler: HandlerFunc,
    ) -> Result<(), RouteError> {
        let full = format!("{}{}", self.groups[group].prefix, pattern);
        self.router.add_route(method.clone(), &full, handler)?;
        info!(method = %method, pattern = %full, "Route registered");
        Ok(())
    }
}

/// A registration handle on one group of an [`Engine`].
///
/// Borrowing the engine mutably keeps registration single-threaded and
/// confined to setup.
pub struct RouterGroup<'a> {
    engine: &'a mut Engine,
    index: usize,
}

impl RouterGroup<'_> {
    /// Absolute prefix of this group.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.engine.groups[self.index].prefix
    }

    /// Create a subgroup whose prefix is this group's prefix followed by `prefix`.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidGroupPrefix`] for a malformed prefix.
    pub fn group(&mut self, prefix: &str) -> Result<RouterGroup<'_>, RouteError> {
        let index = self.engine.new_group(self.index, prefix)?;
        Ok(RouterGroup {
            engine: &mut *self.engine,
            index,
        })
    }

    /// Append middleware to this group.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.engine.groups[self.index]
            .middlewares
            .push(Arc::new(middleware));
        self
    }

    /// Register `handler` for `method` on this group's prefix plus `pattern`.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] from pattern validation.
    pub fn add_route<F>(&mut self, method: Method, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.engine
            .register(self.index, method, pattern, Arc::new(handler))
    }

    /// # Errors
    ///
    /// See [`RouterGroup::add_route`].
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::GET, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`RouterGroup::add_route`].
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::POST, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`RouterGroup::add_route`].
    pub fn put<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::PUT, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`RouterGroup::add_route`].
    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::PATCH, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`RouterGroup::add_route`].
    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::DELETE, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`RouterGroup::add_route`].
    pub fn head<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::HEAD, pattern, handler)
    }

    /// # Errors
    ///
    /// See [`RouterGroup::add_route`].
    pub fn options<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.add_route(Method::OPTIONS, pattern, handler)
    }

    /// Serve files under `root` for `GET <prefix><relative>/*filepath`.
    ///
    /// A missing or unreadable file, or a path escaping `root`, answers 404
    /// with an empty body.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] from the resulting pattern.
    pub fn static_files<P: Into<PathBuf>>(&mut self, relative: &str, root: P) -> Result<(), RouteError> {
        let files = StaticFiles::new(root);
        let pattern = format!("{}/*filepath", relative.trim_end_matches('/'));
        info!(
            prefix = %format!("{}{}", self.prefix(), relative),
            root = %files.base_dir().display(),
            "Static files mounted"
        );
        self.get(&pattern, move |c| {
            let file = c.param("filepath").unwrap_or_default().to_string();
            match files.load(&file) {
                Ok((bytes, content_type)) => {
                    c.set_header("Content-Type", content_type);
                    c.data(StatusCode::OK, bytes);
                }
                Err(err) => {
                    debug!(
                        request_id = %c.request_id(),
                        file = %file,
                        error = %err,
                        "Static file not served"
                    );
                    c.set_status(StatusCode::NOT_FOUND);
                }
            }
        })
    }
}
