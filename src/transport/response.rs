//! Normalized upstream response envelope.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Status, headers, and body of one upstream response.
///
/// The envelope never carries an error; the status alone signals success or
/// failure. Header names are stored lower-cased, values as received. Bodies
/// are parsed as JSON when possible, kept as a plain string otherwise, and
/// `Null` when empty.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl ResponseEnvelope {
    /// Whether the status falls in 200-299.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
