//! Minimal N-Triples rendering.

use std::fmt::Write as _;

/// XSD datatype for timestamp literals.
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
/// XSD datatype for sizes.
pub const XSD_LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

/// Object position of a triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    Iri(String),
    Literal(String),
    Typed { value: String, datatype: &'static str },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri(value.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn date_time(value: impl Into<String>) -> Self {
        Self::Typed {
            value: value.into(),
            datatype: XSD_DATE_TIME,
        }
    }

    pub fn long(value: u64) -> Self {
        Self::Typed {
            value: value.to_string(),
            datatype: XSD_LONG,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

/// Render triples one per line, in the order given.
pub fn to_ntriples(triples: &[Triple]) -> String {
    let mut out = String::new();
    for triple in triples {
        write_iri(&mut out, &triple.subject);
        out.push(' ');
        write_iri(&mut out, &triple.predicate);
        out.push(' ');
        match &triple.object {
            Term::Iri(iri) => write_iri(&mut out, iri),
            Term::Literal(value) => write_literal(&mut out, value),
            Term::Typed { value, datatype } => {
                write_literal(&mut out, value);
                out.push_str("^^");
                write_iri(&mut out, datatype);
            }
        }
        out.push_str(" .\n");
    }
    out
}

fn write_iri(out: &mut String, iri: &str) {
    out.push('<');
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\0'..=' ' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            _ => out.push(c),
        }
    }
    out.push('>');
}

fn write_literal(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_term_kind() {
        let s = "info:fedora/demo:1";
        let out = to_ntriples(&[
            Triple::new(s, "http://purl.org/dc/terms/title", Term::literal("A title")),
            Triple::new(s, "http://example.org/p", Term::iri("http://example.org/o")),
            Triple::new(
                s,
                "info:fedora/fedora-system:def/model#createdDate",
                Term::date_time("2008-07-02T05:09:42.015Z"),
            ),
        ]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "<info:fedora/demo:1> <http://purl.org/dc/terms/title> \"A title\" ."
        );
        assert_eq!(
            lines[1],
            "<info:fedora/demo:1> <http://example.org/p> <http://example.org/o> ."
        );
        assert_eq!(
            lines[2],
            "<info:fedora/demo:1> <info:fedora/fedora-system:def/model#createdDate> \
             \"2008-07-02T05:09:42.015Z\"^^<http://www.w3.org/2001/XMLSchema#dateTime> ."
        );
    }

    #[test]
    fn escapes_literals() {
        let out = to_ntriples(&[Triple::new(
            "s",
            "p",
            Term::literal("say \"hi\"\nback\\slash"),
        )]);
        assert_eq!(out, "<s> <p> \"say \\\"hi\\\"\\nback\\\\slash\" .\n");
    }

    #[test]
    fn escapes_iris() {
        let out = to_ntriples(&[Triple::new("a b", "p", Term::iri("x<y>"))]);
        assert_eq!(out, "<a\\u0020b> <p> <x\\u003Cy\\u003E> .\n");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(to_ntriples(&[]), "");
    }
}
