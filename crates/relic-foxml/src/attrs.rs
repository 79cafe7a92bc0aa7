use quick_xml::events::BytesStart;

use crate::error::{FoxmlError, FoxmlResult};

/// Owned copy of an element's attributes, split into namespace declarations
/// and ordinary values keyed by local name.
#[derive(Debug, Default)]
pub(crate) struct ElementAttrs {
    element: String,
    values: Vec<(String, String)>,
    namespaces: Vec<(String, String)>,
}

impl ElementAttrs {
    pub(crate) fn parse(start: &BytesStart<'_>, position: u64) -> FoxmlResult<Self> {
        let element = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attrs = Self {
            element,
            ..Self::default()
        };
        for attr in start.attributes() {
            let attr = attr.map_err(|e| FoxmlError::Xml {
                position,
                message: e.to_string(),
            })?;
            let value = attr
                .unescape_value()
                .map_err(|e| FoxmlError::Xml {
                    position,
                    message: e.to_string(),
                })?
                .into_owned();
            let key = attr.key.as_ref();
            if let Some(prefix) = namespace_prefix(key) {
                attrs.namespaces.push((prefix, value));
            } else {
                let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                attrs.values.push((name, value));
            }
        }
        Ok(attrs)
    }

    pub(crate) fn element(&self) -> &str {
        &self.element
    }

    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`get`](Self::get), treating empty values as absent.
    pub(crate) fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    pub(crate) fn required(&self, name: &'static str) -> FoxmlResult<&str> {
        self.non_empty(name)
            .ok_or_else(|| FoxmlError::MissingAttribute {
                element: self.element.clone(),
                attribute: name,
            })
    }

    pub(crate) fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    pub(crate) fn invalid(&self, attribute: &'static str, value: &str, reason: &str) -> FoxmlError {
        FoxmlError::InvalidAttribute {
            element: self.element.clone(),
            attribute,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// `xmlns` declares the default namespace (prefix `""`), `xmlns:p` declares `p`.
pub(crate) fn namespace_prefix(key: &[u8]) -> Option<String> {
    if key == b"xmlns" {
        Some(String::new())
    } else {
        key.strip_prefix(b"xmlns:")
            .map(|p| String::from_utf8_lossy(p).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_namespaces_from_values() {
        let start = BytesStart::from_content(
            r#"foxml:datastream xmlns="urn:d" xmlns:foxml="urn:f" ID="DS1" CONTROL_GROUP="M" LABEL="""#,
            16,
        );
        let attrs = ElementAttrs::parse(&start, 0).unwrap();
        assert_eq!(attrs.element(), "datastream");
        assert_eq!(attrs.get("ID"), Some("DS1"));
        assert_eq!(attrs.get("LABEL"), Some(""));
        assert_eq!(attrs.non_empty("LABEL"), None);
        assert_eq!(
            attrs.namespaces(),
            &[
                (String::new(), "urn:d".to_string()),
                ("foxml".to_string(), "urn:f".to_string())
            ]
        );
    }

    #[test]
    fn unescapes_values() {
        let start = BytesStart::from_content(r#"property NAME="a" VALUE="x &amp; y""#, 8);
        let attrs = ElementAttrs::parse(&start, 0).unwrap();
        assert_eq!(attrs.get("VALUE"), Some("x & y"));
    }

    #[test]
    fn missing_required_attribute() {
        let start = BytesStart::from_content("datastream ID=\"\"", 10);
        let attrs = ElementAttrs::parse(&start, 0).unwrap();
        let err = attrs.required("ID").unwrap_err();
        assert!(matches!(err, FoxmlError::MissingAttribute { attribute: "ID", .. }));
        assert!(attrs.required("CONTROL_GROUP").is_err());
    }
}
