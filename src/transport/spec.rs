//! Request descriptions and query-string assembly.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Method, Url};
use serde_json::Value;

/// Key suffix marking a repeated query parameter (`ids[]=1&ids[]=2`).
///
/// Sequence values under any other key are joined with commas into a single
/// pair.
pub const ARRAY_KEY_SUFFIX: &str = "[]";

/// A query parameter value: a single scalar or a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Many(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Single(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Many(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        QueryValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// One logical HTTP request: method, target, headers, query, body, timeout.
///
/// Built fresh per call with the consuming builder methods; never mutated
/// after construction. The path may be absolute (`https://...`) or relative
/// to the client's base URL. Header names are lower-cased on insert so a
/// per-request header reliably overrides a client default regardless of
/// spelling.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, QueryValue>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    /// Create a spec for the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// GET request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request for `path` carrying a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// PUT request for `path` carrying a JSON body.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    /// DELETE request for `path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header; overrides the client default of the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the client-level timeout for this request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Append query pairs to `url`.
///
/// Keys are emitted in ascending order. A sequence under a key ending in
/// [`ARRAY_KEY_SUFFIX`] emits one pair per element in original order; any
/// other sequence is comma-joined into a single pair.
pub(crate) fn append_query(url: &mut Url, query: &BTreeMap<String, QueryValue>) {
    if query.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in query {
        match value {
            QueryValue::Single(single) => {
                pairs.append_pair(key, single);
            }
            QueryValue::Many(values) if key.ends_with(ARRAY_KEY_SUFFIX) => {
                for element in values {
                    pairs.append_pair(key, element);
                }
            }
            QueryValue::Many(values) => {
                pairs.append_pair(key, &values.join(","));
            }
        }
    }
}
