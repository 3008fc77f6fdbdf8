//! Path and pattern segmentation.
//!
//! Both request paths and registration patterns are split on `/` with empty
//! segments dropped, so duplicate, leading and trailing slashes collapse.
//! Registration patterns are additionally typed into [`Segment`]s and
//! validated eagerly.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::error::RouteError;

/// One typed segment of a registration pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches exactly this text
    Static(String),
    /// `:name`, matches any single segment and binds it
    Param(Arc<str>),
    /// `*name`, matches the remainder of the path and binds it joined by `/`
    CatchAll(Arc<str>),
}

impl Segment {
    /// Type a raw (non-empty) pattern segment.
    pub fn parse(part: &str) -> Self {
        if let Some(name) = part.strip_prefix(':') {
            Segment::Param(Arc::from(name))
        } else if let Some(name) = part.strip_prefix('*') {
            Segment::CatchAll(Arc::from(name))
        } else {
            Segment::Static(part.to_string())
        }
    }

    /// True for parameter and catch-all segments.
    #[inline]
    #[must_use]
    pub fn is_wild(&self) -> bool {
        !matches!(self, Segment::Static(_))
    }

    /// Same literal text, or the same dynamic kind whatever the name.
    ///
    /// Trie nodes are shared between segments of the same shape, so one
    /// node holds at most one `:` child and one `*` child.
    #[inline]
    #[must_use]
    pub fn same_shape(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Static(a), Segment::Static(b)) => a == b,
            (Segment::Param(_), Segment::Param(_))
            | (Segment::CatchAll(_), Segment::CatchAll(_)) => true,
            _ => false,
        }
    }

    /// Name bound by a dynamic segment.
    #[inline]
    #[must_use]
    pub fn param_name(&self) -> Option<&Arc<str>> {
        match self {
            Segment::Static(_) => None,
            Segment::Param(name) | Segment::CatchAll(name) => Some(name),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(s) => f.write_str(s),
            Segment::Param(name) => write!(f, ":{name}"),
            Segment::CatchAll(name) => write!(f, "*{name}"),
        }
    }
}

/// Split a request path into its non-empty segments.
#[inline]
pub fn parse_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Split and validate a registration pattern.
///
/// # Errors
///
/// See [`RouteError`] for the rejected shapes: empty pattern, missing leading
/// slash, unnamed dynamic segment, non-terminal wildcard, repeated name.
pub fn parse_pattern(pattern: &str) -> Result<Vec<Segment>, RouteError> {
    if pattern.is_empty() {
        return Err(RouteError::EmptyPattern);
    }
    if !pattern.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash {
            pattern: pattern.to_string(),
        });
    }

    let parts = parse_path(pattern);
    let mut segments = Vec::with_capacity(parts.len());
    let mut names: HashSet<Arc<str>> = HashSet::new();

    for (i, part) in parts.iter().enumerate() {
        let segment = Segment::parse(part);
        if let Some(name) = segment.param_name() {
            if name.is_empty() {
                return Err(RouteError::EmptyParamName {
                    pattern: pattern.to_string(),
                });
            }
            if !names.insert(Arc::clone(name)) {
                return Err(RouteError::DuplicateParam {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }
        }
        if matches!(segment, Segment::CatchAll(_)) && i + 1 < parts.len() {
            return Err(RouteError::CatchAllNotLast {
                pattern: pattern.to_string(),
                segment: (*part).to_string(),
            });
        }
        segments.push(segment);
    }

    Ok(segments)
}

/// Validate a group prefix and return its segments.
///
/// # Errors
///
/// [`RouteError::InvalidGroupPrefix`] unless the prefix is empty or starts
/// with `/` and has literal segments only.
pub fn parse_group_prefix(prefix: &str) -> Result<Vec<String>, RouteError> {
    if prefix.is_empty() {
        return Ok(Vec::new());
    }
    let parts = parse_path(prefix);
    if !prefix.starts_with('/') || parts.iter().any(|p| p.starts_with(':') || p.starts_with('*')) {
        return Err(RouteError::InvalidGroupPrefix {
            prefix: prefix.to_string(),
        });
    }
    Ok(parts.into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_collapses_slashes() {
        assert_eq!(parse_path("//a///b/"), vec!["a", "b"]);
        assert!(parse_path("/").is_empty());
        assert!(parse_path("").is_empty());
    }

    #[test]
    fn test_parse_pattern_types_segments() {
        let segs = parse_pattern("/p/:lang/*rest").unwrap();
        assert_eq!(
            segs,
            vec![
                Segment::Static("p".to_string()),
                Segment::Param(Arc::from("lang")),
                Segment::CatchAll(Arc::from("rest")),
            ]
        );
    }

    #[test]
    fn test_parse_pattern_root() {
        assert!(parse_pattern("/").unwrap().is_empty());
    }

    #[test]
    fn test_parse_pattern_rejections() {
        assert_eq!(parse_pattern(""), Err(RouteError::EmptyPattern));
        assert!(matches!(
            parse_pattern("users"),
            Err(RouteError::MissingLeadingSlash { .. })
        ));
        assert!(matches!(
            parse_pattern("/users/:"),
            Err(RouteError::EmptyParamName { .. })
        ));
        assert!(matches!(
            parse_pattern("/static/*"),
            Err(RouteError::EmptyParamName { .. })
        ));
        assert!(matches!(
            parse_pattern("/static/*path/extra"),
            Err(RouteError::CatchAllNotLast { .. })
        ));
        assert!(matches!(
            parse_pattern("/a/:id/b/:id"),
            Err(RouteError::DuplicateParam { .. })
        ));
    }

    #[test]
    fn test_group_prefix_validation() {
        assert!(parse_group_prefix("").unwrap().is_empty());
        assert_eq!(parse_group_prefix("/v1/admin").unwrap(), vec!["v1", "admin"]);
        assert!(parse_group_prefix("v1").is_err());
        assert!(parse_group_prefix("/users/:id").is_err());
    }

    #[test]
    fn test_segment_display_round_trips_raw_text() {
        for raw in ["docs", ":lang", "*filepath"] {
            assert_eq!(Segment::parse(raw).to_string(), raw);
        }
    }
}
