use std::collections::BTreeSet;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Writer;

use crate::attrs::namespace_prefix;
use crate::error::{FoxmlError, FoxmlResult};

/// Serialize an inline XML fragment captured from the object document.
///
/// `events` holds the content of one `xmlContent` element, without the
/// element itself. Tags are copied from their raw text. Namespaces declared
/// on enclosing FOXML elements and used inside the fragment are appended to
/// each top-level element that lacks them, so the bytes stand alone.
pub(crate) fn serialize_fragment(
    events: Vec<Event<'static>>,
    inherited: &[(String, String)],
) -> FoxmlResult<Vec<u8>> {
    let used = used_prefixes(&events);
    let missing: Vec<&(String, String)> = inherited
        .iter()
        .filter(|(prefix, _)| used.contains(prefix.as_str()))
        .collect();

    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    for event in events {
        let event = match event {
            Event::Start(start) => {
                depth += 1;
                if depth == 1 {
                    Event::Start(redeclare(start, &missing)?)
                } else {
                    Event::Start(start)
                }
            }
            Event::Empty(start) if depth == 0 => Event::Empty(redeclare(start, &missing)?),
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                Event::End(end)
            }
            other => other,
        };
        writer
            .write_event(event)
            .map_err(|e| FoxmlError::Malformed(format!("failed to copy inline XML: {e}")))?;
    }
    Ok(writer.into_inner())
}

fn used_prefixes(events: &[Event<'static>]) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    for event in events {
        let (Event::Start(start) | Event::Empty(start)) = event else {
            continue;
        };
        used.insert(prefix_of(start.name().as_ref()));
        for attr in start.attributes().flatten() {
            let key = attr.key.as_ref();
            if namespace_prefix(key).is_some() || !key.contains(&b':') {
                continue;
            }
            let prefix = prefix_of(key);
            if prefix != "xml" {
                used.insert(prefix);
            }
        }
    }
    used
}

fn prefix_of(qname: &[u8]) -> String {
    match qname.iter().position(|b| *b == b':') {
        Some(i) => String::from_utf8_lossy(&qname[..i]).into_owned(),
        None => String::new(),
    }
}

/// Append declarations for `bindings` the tag does not declare itself.
fn redeclare(
    start: BytesStart<'static>,
    bindings: &[&(String, String)],
) -> FoxmlResult<BytesStart<'static>> {
    let mut declared = BTreeSet::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FoxmlError::Malformed(format!("invalid attribute: {e}")))?;
        if let Some(prefix) = namespace_prefix(attr.key.as_ref()) {
            declared.insert(prefix);
        }
    }
    let absent: Vec<_> = bindings
        .iter()
        .filter(|(prefix, _)| !declared.contains(prefix.as_str()))
        .collect();
    if absent.is_empty() {
        return Ok(start);
    }

    let raw: &[u8] = &start;
    let mut content = std::str::from_utf8(raw)
        .map_err(|e| FoxmlError::Malformed(format!("invalid start tag: {e}")))?
        .trim_end()
        .to_string();
    for (prefix, uri) in absent {
        if prefix.is_empty() {
            content.push_str(&format!(" xmlns=\"{}\"", escape(uri.as_str())));
        } else {
            content.push_str(&format!(" xmlns:{prefix}=\"{}\"", escape(uri.as_str())));
        }
    }
    let name_len = start.name().as_ref().len();
    Ok(BytesStart::from_content(content, name_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;

    fn events_of(xml: &str) -> Vec<Event<'static>> {
        let mut reader = Reader::from_str(xml);
        let mut out = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Eof => break,
                event => out.push(event.into_owned()),
            }
        }
        out
    }

    fn bindings(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(p, u)| (p.to_string(), u.to_string()))
            .collect()
    }

    #[test]
    fn redeclares_only_used_inherited_namespaces() {
        let events = events_of(r#"<dc:title xml:lang="en">A &amp; B</dc:title>"#);
        let inherited = bindings(&[("dc", "urn:dc"), ("foxml", "urn:foxml")]);
        let out = serialize_fragment(events, &inherited).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<dc:title xml:lang="en" xmlns:dc="urn:dc">A &amp; B</dc:title>"#
        );
    }

    #[test]
    fn keeps_local_declarations() {
        let events = events_of(r#"<oai_dc:dc xmlns:oai_dc="urn:local"><oai_dc:x/></oai_dc:dc>"#);
        let inherited = bindings(&[("oai_dc", "urn:outer")]);
        let out = serialize_fragment(events, &inherited).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<oai_dc:dc xmlns:oai_dc="urn:local"><oai_dc:x/></oai_dc:dc>"#
        );
    }

    #[test]
    fn default_namespace_is_carried_for_unprefixed_elements() {
        let events = events_of("<record><id>1</id></record>");
        let inherited = bindings(&[("", "urn:default")]);
        let out = serialize_fragment(events, &inherited).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<record xmlns="urn:default"><id>1</id></record>"#
        );
    }

    #[test]
    fn attribute_prefixes_count_as_used() {
        let events = events_of(r#"<rdf:Description rdf:about="x"/>"#);
        let inherited = bindings(&[("rdf", "urn:rdf")]);
        let out = serialize_fragment(events, &inherited).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<rdf:Description rdf:about="x" xmlns:rdf="urn:rdf"/>"#
        );
    }

    #[test]
    fn original_tag_text_is_kept() {
        let xml = "<oai_dc:dc\n    xmlns:oai_dc='urn:oai'\n    xmlns:dc='urn:dc'><dc:title a='1'>T</dc:title></oai_dc:dc>";
        let inherited = bindings(&[("dc", "urn:outer"), ("foxml", "urn:foxml")]);
        let out = serialize_fragment(events_of(xml), &inherited).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), xml);
    }

    #[test]
    fn declarations_are_appended_to_raw_tag() {
        let xml = "<dc:title\n    xml:lang='en' >x</dc:title>";
        let inherited = bindings(&[("dc", "urn:a&b")]);
        let out = serialize_fragment(events_of(xml), &inherited).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<dc:title\n    xml:lang='en' xmlns:dc=\"urn:a&amp;b\">x</dc:title>"
        );
    }
}
