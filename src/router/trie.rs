//! Segment trie used for per-method route matching
//!
//! Each node consumes one path segment. Routes live on terminal nodes only;
//! intermediate nodes carry no endpoint and are never match targets.
//!
//! ## Precedence
//!
//! Insertion reuses a child whose segment has the same shape: identical
//! literal text, or the same dynamic kind whatever its name. A node therefore
//! holds any number of literal children but at most one `:param` child and
//! one `*catch-all` child; parameter names live on the endpoint, not the
//! node. Lookup tries, at every depth:
//!
//! 1. the literal child whose text equals the request segment
//! 2. the `:param` child
//! 3. the `*catch-all` child
//!
//! and backtracks depth-first, so `/users/new` beats `/users/:id` regardless of
//! registration order while `/users/:id/posts` is still reachable.

use super::pattern::Segment;
use crate::context::HandlerFunc;

/// A registered route stored on its terminal node
#[derive(Clone)]
pub(crate) struct Endpoint {
    /// Pattern as registered (group prefix included)
    pub pattern: String,
    /// Typed segments of `pattern`, used for parameter extraction
    pub segments: Vec<Segment>,
    pub handler: HandlerFunc,
}

#[derive(Clone)]
pub(crate) struct Node {
    segment: Segment,
    endpoint: Option<Endpoint>,
    children: Vec<Node>,
}

impl Node {
    pub fn root() -> Self {
        Self::new(Segment::Static(String::new()))
    }

    fn new(segment: Segment) -> Self {
        Self {
            segment,
            endpoint: None,
            children: Vec::new(),
        }
    }

    /// Insert `endpoint` under `segments`, returning true if an existing
    /// endpoint on the terminal node was replaced.
    pub fn insert(&mut self, segments: &[Segment], endpoint: Endpoint) -> bool {
        let Some((first, rest)) = segments.split_first() else {
            return self.endpoint.replace(endpoint).is_some();
        };

        if let Some(child) = self.children.iter_mut().find(|c| c.segment.same_shape(first)) {
            return child.insert(rest, endpoint);
        }

        let mut child = Node::new(first.clone());
        let replaced = child.insert(rest, endpoint);
        self.children.push(child);
        replaced
    }

    /// Endpoint on the node that `segments` would terminate at, if any.
    pub fn endpoint_at(&self, segments: &[Segment]) -> Option<&Endpoint> {
        let Some((first, rest)) = segments.split_first() else {
            return self.endpoint.as_ref();
        };
        self.children
            .iter()
            .find(|c| c.segment.same_shape(first))?
            .endpoint_at(rest)
    }

    /// Find the endpoint matching the request segments `parts`.
    pub fn search(&self, parts: &[&str]) -> Option<&Endpoint> {
        if matches!(self.segment, Segment::CatchAll(_)) {
            return self.endpoint.as_ref();
        }
        let Some((first, rest)) = parts.split_first() else {
            return self.endpoint.as_ref();
        };

        let literal = self
            .children
            .iter()
            .filter(|c| matches!(&c.segment, Segment::Static(s) if s == first));
        let params = self
            .children
            .iter()
            .filter(|c| matches!(c.segment, Segment::Param(_)));
        let catch_alls = self
            .children
            .iter()
            .filter(|c| matches!(c.segment, Segment::CatchAll(_)));

        literal
            .chain(params)
            .chain(catch_alls)
            .find_map(|child| child.search(rest))
    }

    /// Number of nodes in this subtree, including `self`.
    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Collect every endpoint pattern in this subtree, depth-first.
    pub fn patterns<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(endpoint) = &self.endpoint {
            out.push(&endpoint.pattern);
        }
        for child in &self.children {
            child.patterns(out);
        }
    }
}
