use crate::context::HandlerFunc;

/// One route group in the engine's flat group list.
///
/// The prefix is absolute: ancestor prefixes are concatenated when the group
/// is created, so request-time matching never walks the hierarchy.
#[derive(Clone)]
pub(crate) struct GroupEntry {
    pub prefix: String,
    /// Non-empty segments of `prefix`
    pub segments: Vec<String>,
    /// Middleware owned by this group only, in registration order
    pub middlewares: Vec<HandlerFunc>,
}

impl GroupEntry {
    pub fn root() -> Self {
        Self {
            prefix: String::new(),
            segments: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    pub fn new(prefix: String, segments: Vec<String>) -> Self {
        Self {
            prefix,
            segments,
            middlewares: Vec::new(),
        }
    }

    /// Segment-aligned prefix test: `/api` covers `/api` and `/api/x` but not `/apiv2`.
    pub fn matches(&self, path_segments: &[&str]) -> bool {
        self.segments.len() <= path_segments.len()
            && self
                .segments
                .iter()
                .zip(path_segments)
                .all(|(prefix, segment)| prefix == segment)
    }
}
