//! Descriptive metadata for object roots and binaries.

use relic_foxml::DatastreamVersion;
use relic_types::{is_timestamp_property, ObjectProperties};
use serde::{Deserialize, Serialize};

use crate::rdf::{Term, Triple};

pub const DC_IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
pub const DC_TITLE: &str = "http://purl.org/dc/terms/title";
pub const PREMIS_FORMAT: &str = "http://www.loc.gov/premis/rdf/v1#formatDesignation";
pub const PREMIS_DIGEST: &str = "http://www.loc.gov/premis/rdf/v1#hasMessageDigest";
pub const PREMIS_SIZE: &str = "http://www.loc.gov/premis/rdf/v1#hasSize";
pub const EBUCORE_MIME_TYPE: &str = "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#hasMimeType";
pub const MODEL_DATASTREAM_STATE: &str = "info:fedora/fedora-system:def/model#state";
pub const MODEL_ALT_IDS: &str = "info:fedora/fedora-system:def/model#altIds";
pub const FEDORA_CREATED: &str = "http://fedora.info/definitions/v4/repository#created";
pub const FEDORA_LAST_MODIFIED: &str = "http://fedora.info/definitions/v4/repository#lastModified";

/// How much a binary description records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionDetail {
    /// Identifier, label, format, state and mime type.
    #[default]
    Minimal,
    /// Minimal plus digest, size, alternate ids and timestamps.
    Full,
}

/// Triples for the object root container, one per property.
///
/// Timestamp properties become `xsd:dateTime` literals, everything else a
/// plain literal.
pub fn root_triples(subject: &str, properties: &ObjectProperties) -> Vec<Triple> {
    properties
        .iter()
        .map(|property| {
            let object = if is_timestamp_property(&property.name) {
                Term::date_time(&property.value)
            } else {
                Term::literal(&property.value)
            };
            Triple::new(subject, &property.name, object)
        })
        .collect()
}

/// Triples describing one binary.
///
/// `digest_urn` and `size` are what was actually recorded in the binary's
/// header, when known.
pub fn binary_triples(
    subject: &str,
    version: &DatastreamVersion,
    detail: DescriptionDetail,
    digest_urn: Option<&str>,
    size: Option<u64>,
) -> Vec<Triple> {
    let datastream = version.datastream();
    let mut triples = vec![Triple::new(subject, DC_IDENTIFIER, Term::literal(datastream.id()))];
    if !version.label().is_empty() {
        triples.push(Triple::new(subject, DC_TITLE, Term::literal(version.label())));
    }
    if let Some(format) = version.format_uri().filter(|f| !f.is_empty()) {
        triples.push(Triple::new(subject, PREMIS_FORMAT, Term::literal(format)));
    }
    triples.push(Triple::new(
        subject,
        MODEL_DATASTREAM_STATE,
        Term::literal(datastream.state().label()),
    ));
    if !version.mime_type().is_empty() {
        triples.push(Triple::new(subject, EBUCORE_MIME_TYPE, Term::literal(version.mime_type())));
    }

    if detail == DescriptionDetail::Full {
        if let Some(urn) = digest_urn {
            triples.push(Triple::new(subject, PREMIS_DIGEST, Term::iri(urn)));
        }
        if let Some(size) = size {
            triples.push(Triple::new(subject, PREMIS_SIZE, Term::long(size)));
        }
        for alt_id in version.alt_ids() {
            triples.push(Triple::new(subject, MODEL_ALT_IDS, Term::literal(alt_id)));
        }
        triples.push(Triple::new(subject, FEDORA_CREATED, Term::date_time(version.created())));
        triples.push(Triple::new(subject, FEDORA_LAST_MODIFIED, Term::date_time(version.created())));
    }
    triples
}
