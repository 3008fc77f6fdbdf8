use std::fmt;

/// Route registration error
///
/// Returned by the registration API when a pattern or group prefix cannot be
/// turned into an unambiguous trie entry. Registration never succeeds
/// partially: the trie is untouched when an error is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern was the empty string
    EmptyPattern,
    /// The pattern did not start with `/`
    MissingLeadingSlash {
        /// The rejected pattern
        pattern: String,
    },
    /// A `:` or `*` segment without a name
    EmptyParamName {
        /// The rejected pattern
        pattern: String,
    },
    /// A `*name` segment followed by further segments
    CatchAllNotLast {
        /// The rejected pattern
        pattern: String,
        /// The catch-all segment that is not terminal
        segment: String,
    },
    /// The same parameter name bound twice in one pattern
    DuplicateParam {
        /// The rejected pattern
        pattern: String,
        /// The repeated name
        name: String,
    },
    /// Same shape as an already registered route, with different parameter names
    ConflictingParam {
        /// The rejected pattern
        pattern: String,
        /// The registered pattern it would collide with
        existing: String,
    },
    /// Group prefixes must be empty or start with `/` and contain only literal segments
    InvalidGroupPrefix {
        /// The rejected prefix
        prefix: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::EmptyPattern => write!(f, "route pattern must not be empty"),
            RouteError::MissingLeadingSlash { pattern } => {
                write!(f, "route pattern '{pattern}' must start with '/'")
            }
            RouteError::EmptyParamName { pattern } => {
                write!(
                    f,
                    "route pattern '{pattern}' contains a ':' or '*' segment without a name"
                )
            }
            RouteError::CatchAllNotLast { pattern, segment } => {
                write!(
                    f,
                    "route pattern '{pattern}': wildcard segment '{segment}' must be the last segment"
                )
            }
            RouteError::DuplicateParam { pattern, name } => {
                write!(
                    f,
                    "route pattern '{pattern}' binds parameter '{name}' more than once"
                )
            }
            RouteError::ConflictingParam { pattern, existing } => {
                write!(
                    f,
                    "route pattern '{pattern}' conflicts with '{existing}': same segments, different parameter names"
                )
            }
            RouteError::InvalidGroupPrefix { prefix } => {
                write!(
                    f,
                    "group prefix '{prefix}' must be empty or start with '/' and contain only literal segments"
                )
            }
        }
    }
}

impl std::error::Error for RouteError {}
