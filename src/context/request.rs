use http::Method;
use std::collections::HashMap;

/// Transport-neutral view of one inbound request.
///
/// Built by the server from the wire request, or directly in tests with
/// [`HttpRequest::new`] and the `with_*` builders.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Percent-decoded path without the query string
    pub path: String,
    /// Decoded query pairs in arrival order
    pub query: Vec<(String, String)>,
    /// Headers with lowercase names
    pub headers: HashMap<String, String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a request from a method and a request target such as `/hello?name=x`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method,
            path,
            query,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First query value for `key`.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        first_value(&self.query, key)
    }

    /// Form value for `key`: urlencoded body first, then the query string.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<String> {
        if self.is_urlencoded_form() {
            let form = parse_urlencoded(&self.body);
            if let Some(v) = first_value(&form, key) {
                return Some(v.to_string());
            }
        }
        self.query_value(key).map(str::to_string)
    }

    /// Path plus query string, as the client sent it modulo decoding.
    #[must_use]
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }

    fn is_urlencoded_form(&self) -> bool {
        self.header("content-type")
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false)
    }
}

/// Split a request target into its decoded path and query pairs.
///
/// An empty path becomes `/`.
pub(crate) fn split_target(target: &str) -> (String, Vec<(String, String)>) {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, parse_urlencoded(query.as_bytes())),
        None => (target, Vec::new()),
    };
    let path = if path.is_empty() { "/".to_string() } else { decode_path(path) };
    (path, query)
}

/// Percent-decode each `/`-separated segment of `path`.
///
/// An encoded slash stays `%2F` so it never acts as a separator. `+` is kept
/// as is; only query strings use it for spaces.
pub fn decode_path(path: &str) -> String {
    if !path.contains('%') {
        return path.to_string();
    }
    path.split('/')
        .map(|segment| {
            String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes()))
                .replace('/', "%2F")
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode `a=1&b=2` pairs, keeping arrival order and duplicates.
pub fn parse_urlencoded(input: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(input)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
