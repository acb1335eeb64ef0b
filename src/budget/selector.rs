//! Field selection for budget enforcement.

use std::fmt;

use serde_json::Value;

/// One step in a path through a JSON tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object member by key.
    Key(String),
    /// Array element by position.
    Index(usize),
}

/// A path to one field inside a payload tree.
///
/// Paths are built root-down and resolved against a concrete payload at
/// enforcement time. A path that no longer resolves (the payload changed
/// shape) is simply skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Start a path at a top-level object key.
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Key(name.into())],
        }
    }

    /// Descend into an object member.
    pub fn then_key(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(name.into()));
        self
    }

    /// Descend into an array element.
    pub fn then_index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Resolve the path against a payload, if it still exists.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                PathSegment::Key(name) => current.get(name.as_str())?,
                PathSegment::Index(index) => current.get(*index)?,
            };
        }
        Some(current)
    }

    /// Resolve the path for in-place mutation.
    pub fn lookup_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                PathSegment::Key(name) => current.get_mut(name.as_str())?,
                PathSegment::Index(index) => current.get_mut(*index)?,
            };
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                write!(f, ".")?;
            }
            match segment {
                PathSegment::Key(name) => write!(f, "{name}")?,
                PathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

/// Enumerates the string fields of a payload that may be shrunk.
///
/// Enumeration order is significant: when two candidates tie on length,
/// the earlier one wins.
pub trait ShrinkSelector: Send + Sync {
    fn candidates(&self, payload: &Value) -> Vec<FieldPath>;
}

impl<F> ShrinkSelector for F
where
    F: Fn(&Value) -> Vec<FieldPath> + Send + Sync,
{
    fn candidates(&self, payload: &Value) -> Vec<FieldPath> {
        self(payload)
    }
}

/// Selects named string fields at the top level of an object payload.
#[derive(Debug, Clone)]
pub struct TopLevelFields {
    fields: Vec<String>,
}

impl TopLevelFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl ShrinkSelector for TopLevelFields {
    fn candidates(&self, payload: &Value) -> Vec<FieldPath> {
        self.fields
            .iter()
            .filter(|name| matches!(payload.get(name.as_str()), Some(Value::String(_))))
            .map(FieldPath::key)
            .collect()
    }
}

/// Selects named string fields on every element of a list-valued key.
///
/// Typical shape: `{"items": [{"name": ..., "snippet": ...}, ...]}` with
/// the snippet of each item eligible for shrinking.
#[derive(Debug, Clone)]
pub struct ListFields {
    list_key: String,
    fields: Vec<String>,
}

impl ListFields {
    pub fn new<I, S>(list_key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list_key: list_key.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl ShrinkSelector for ListFields {
    fn candidates(&self, payload: &Value) -> Vec<FieldPath> {
        let Some(Value::Array(elements)) = payload.get(self.list_key.as_str()) else {
            return Vec::new();
        };
        let mut paths = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            for field in &self.fields {
                if matches!(element.get(field.as_str()), Some(Value::String(_))) {
                    paths.push(
                        FieldPath::key(self.list_key.clone())
                            .then_index(index)
                            .then_key(field.clone()),
                    );
                }
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_resolves_nested_values() {
        let payload = json!({"items": [{"name": "alpha"}, {"name": "beta"}]});
        let path = FieldPath::key("items").then_index(1).then_key("name");

        assert_eq!(path.lookup(&payload), Some(&json!("beta")));
        assert_eq!(path.to_string(), "items.1.name");
    }

    #[test]
    fn test_path_misses_return_none() {
        let payload = json!({"items": []});

        assert_eq!(FieldPath::key("missing").lookup(&payload), None);
        assert_eq!(
            FieldPath::key("items").then_index(0).lookup(&payload),
            None
        );
    }

    #[test]
    fn test_lookup_mut_allows_in_place_edit() {
        let mut payload = json!({"summary": "long text"});
        let path = FieldPath::key("summary");

        if let Some(slot) = path.lookup_mut(&mut payload) {
            *slot = Value::String("cut".into());
        }
        assert_eq!(payload, json!({"summary": "cut"}));
    }

    #[test]
    fn test_top_level_selector_skips_non_strings() {
        let payload = json!({"title": "t", "count": 4, "body": "b"});
        let selector = TopLevelFields::new(["title", "count", "body", "missing"]);

        let paths = selector.candidates(&payload);
        assert_eq!(
            paths,
            vec![FieldPath::key("title"), FieldPath::key("body")]
        );
    }

    #[test]
    fn test_list_selector_walks_every_element() {
        let payload = json!({
            "items": [
                {"name": "a", "snippet": "one"},
                {"name": "b"},
                {"snippet": "three", "extra": 9}
            ]
        });
        let selector = ListFields::new("items", ["name", "snippet"]);

        let paths: Vec<String> = selector
            .candidates(&payload)
            .iter()
            .map(FieldPath::to_string)
            .collect();
        assert_eq!(
            paths,
            vec!["items.0.name", "items.0.snippet", "items.1.name", "items.2.snippet"]
        );
    }

    #[test]
    fn test_closures_are_selectors() {
        let selector = |payload: &Value| {
            if payload.get("note").is_some() {
                vec![FieldPath::key("note")]
            } else {
                Vec::new()
            }
        };

        assert_eq!(
            selector.candidates(&json!({"note": "x"})),
            vec![FieldPath::key("note")]
        );
        assert!(selector.candidates(&json!({})).is_empty());
    }
}
