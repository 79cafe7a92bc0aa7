use std::fmt;

use serde::{Deserialize, Serialize};

use crate::datastream::DatastreamState;
use crate::vocab;

/// Identity of one legacy repository object.
///
/// Created once when decoding of an object begins and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectInfo {
    pid: String,
    uri: Option<String>,
}

impl ObjectInfo {
    /// Create object info from a legacy pid and optional source URI.
    pub fn new(pid: impl Into<String>, uri: Option<String>) -> Self {
        Self {
            pid: pid.into(),
            uri,
        }
    }

    /// The legacy persistent identifier (e.g. `demo:1`).
    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// The object's URI in the source repository, if the serialization had one.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

impl fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pid)
    }
}

/// A single object-level property: a URI-like name and a string value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub name: String,
    pub value: String,
}

impl ObjectProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of object properties, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectProperties {
    properties: Vec<ObjectProperty>,
}

impl ObjectProperties {
    /// Create an empty property list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property, keeping document order.
    pub fn push(&mut self, property: ObjectProperty) {
        self.properties.push(property);
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectProperty> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The object's state from the `model#state` property, if present and known.
    pub fn state(&self) -> Option<DatastreamState> {
        self.get(vocab::MODEL_STATE)
            .and_then(|v| DatastreamState::from_code(v).ok())
    }

    /// The object's creation date property, if present.
    pub fn created_date(&self) -> Option<&str> {
        self.get(vocab::MODEL_CREATED_DATE)
    }
}

impl FromIterator<ObjectProperty> for ObjectProperties {
    fn from_iter<I: IntoIterator<Item = ObjectProperty>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ObjectProperties {
    type Item = &'a ObjectProperty;
    type IntoIter = std::slice::Iter<'a, ObjectProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ObjectProperties {
        vec![
            ObjectProperty::new(vocab::MODEL_STATE, "Active"),
            ObjectProperty::new(vocab::MODEL_LABEL, "A label"),
            ObjectProperty::new(vocab::MODEL_CREATED_DATE, "2008-07-02T05:09:42.015Z"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn object_info_accessors() {
        let info = ObjectInfo::new("demo:1", Some("info:fedora/demo:1".into()));
        assert_eq!(info.pid(), "demo:1");
        assert_eq!(info.uri(), Some("info:fedora/demo:1"));
        assert_eq!(info.to_string(), "demo:1");
    }

    #[test]
    fn properties_keep_document_order() {
        let props = sample();
        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![vocab::MODEL_STATE, vocab::MODEL_LABEL, vocab::MODEL_CREATED_DATE]
        );
    }

    #[test]
    fn get_returns_first_match() {
        let mut props = sample();
        props.push(ObjectProperty::new(vocab::MODEL_LABEL, "second"));
        assert_eq!(props.get(vocab::MODEL_LABEL), Some("A label"));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn state_and_created_date() {
        let props = sample();
        assert_eq!(props.state(), Some(DatastreamState::Active));
        assert_eq!(props.created_date(), Some("2008-07-02T05:09:42.015Z"));
        assert!(ObjectProperties::new().state().is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let props = sample();
        let json = serde_json::to_string(&props).unwrap();
        let parsed: ObjectProperties = serde_json::from_str(&json).unwrap();
        assert_eq!(props, parsed);
    }
}
