//! Router core module - per-method trie lookup and parameter extraction.

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::RouteError;
use super::pattern::{parse_path, parse_pattern, Segment};
use super::trie::{Endpoint, Node};
use crate::context::HandlerFunc;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage.
///
/// Names are `Arc<str>` shared with the route tree; values are per-request
/// data copied from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Path parameters captured for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(ParamVec);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self(ParamVec::new())
    }

    /// Get a parameter by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, name: Arc<str>, value: String) {
        self.0.push((name, value));
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Copy into a `HashMap`. Allocates; prefer [`Params::get`] on the request path.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Result of successfully matching a request to a route
pub struct RouteMatch<'r> {
    /// The pattern as registered, e.g. `/p/:lang/doc`
    pub pattern: &'r str,
    /// Handler stored on the matched node
    pub handler: &'r HandlerFunc,
    /// Parameters extracted from the request path
    pub params: Params,
}

/// Route table keyed by HTTP method, one trie per method.
///
/// Built during registration and read-only afterwards; lookups take `&self`
/// and are safe to share across request coroutines.
#[derive(Clone, Default)]
pub struct Router {
    roots: HashMap<Method, Node>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `(method, pattern)`.
    ///
    /// Registering the same pair again replaces the handler; the tree shape
    /// does not change. A pattern that differs from a registered one only in
    /// its parameter names would be unreachable, and is rejected instead.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] for malformed or conflicting patterns. Nothing
    /// is inserted in that case.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerFunc,
    ) -> Result<(), RouteError> {
        let segments = parse_pattern(pattern)?;
        if let Some(existing) = self
            .roots
            .get(&method)
            .and_then(|root| root.endpoint_at(&segments))
        {
            if existing.segments != segments {
                return Err(RouteError::ConflictingParam {
                    pattern: pattern.to_string(),
                    existing: existing.pattern.clone(),
                });
            }
        }
        let endpoint = Endpoint {
            pattern: pattern.to_string(),
            segments: segments.clone(),
            handler,
        };
        let replaced = self
            .roots
            .entry(method.clone())
            .or_insert_with(Node::root)
            .insert(&segments, endpoint);
        if replaced {
            info!(method = %method, pattern = %pattern, "Route handler replaced");
        }
        Ok(())
    }

    /// Match `path` against the trie for `method` and extract parameters.
    ///
    /// `None` is the ordinary "no route" outcome, including for methods with
    /// nothing registered.
    #[must_use]
    pub fn get_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let parts = parse_path(path);
        let root = self.roots.get(method)?;
        let endpoint = root.search(&parts)?;
        let params = extract_params(&endpoint.segments, &parts);
        debug!(
            method = %method,
            path = %path,
            pattern = %endpoint.pattern,
            param_count = params.len(),
            "Route matched"
        );
        Some(RouteMatch {
            pattern: &endpoint.pattern,
            handler: &endpoint.handler,
            params,
        })
    }

    /// Registered `(method, pattern)` pairs, methods sorted, patterns depth-first.
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut methods: Vec<&Method> = self.roots.keys().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let mut out = Vec::new();
        for method in methods {
            let mut patterns = Vec::new();
            if let Some(root) = self.roots.get(method) {
                root.patterns(&mut patterns);
            }
            out.extend(patterns.into_iter().map(|p| (method.clone(), p.to_string())));
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self, method: &Method) -> usize {
        self.roots.get(method).map_or(0, Node::node_count)
    }
}

/// Walk the matched pattern against the request segments.
///
/// `:name` binds the segment at the same position; `*name` binds the joined
/// remainder and ends extraction.
fn extract_params(segments: &[Segment], parts: &[&str]) -> Params {
    let mut params = Params::new();
    for (index, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Static(_) => {}
            Segment::Param(name) => {
                if let Some(value) = parts.get(index) {
                    params.push(Arc::clone(name), (*value).to_string());
                }
            }
            Segment::CatchAll(name) => {
                let rest = parts.get(index..).unwrap_or_default();
                params.push(Arc::clone(name), rest.join("/"));
                break;
            }
        }
    }
    params
}
