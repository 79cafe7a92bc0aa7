//! Foundation types for relic, the FOXML-to-OCFL migration toolkit.
//!
//! Every other relic crate depends on `relic-types`. The types here describe
//! a legacy repository object as it is read from its serialization, before any
//! content bytes are touched.
//!
//! # Key Types
//!
//! - [`ObjectInfo`] -- identity of one legacy object (its pid)
//! - [`ObjectProperties`] -- the unversioned object-level properties
//! - [`DatastreamInfo`] -- one datastream's id, control group, state and flags
//! - [`ContentDigest`] -- a digest declared by the legacy serialization
//! - [`LegacyTimestamp`] helpers -- parsing of legacy creation dates

pub mod datastream;
pub mod error;
pub mod object;
pub mod temporal;

pub use datastream::{ContentDigest, ControlGroup, DatastreamInfo, DatastreamState};
pub use error::TypeError;
pub use object::{ObjectInfo, ObjectProperties, ObjectProperty};
pub use temporal::{is_timestamp_property, LegacyTimestamp};

/// Well-known property and predicate names used by the legacy format.
pub mod vocab {
    /// RDF type predicate (legacy FOXML 1.0 object type property).
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// Dublin Core type predicate.
    pub const DC_TYPE: &str = "http://purl.org/dc/elements/1.1/type";
    /// Object state property (`A`, `I`, `D` or the long forms).
    pub const MODEL_STATE: &str = "info:fedora/fedora-system:def/model#state";
    /// Object label property.
    pub const MODEL_LABEL: &str = "info:fedora/fedora-system:def/model#label";
    /// Object owner property.
    pub const MODEL_OWNER_ID: &str = "info:fedora/fedora-system:def/model#ownerId";
    /// Object creation date property.
    pub const MODEL_CREATED_DATE: &str = "info:fedora/fedora-system:def/model#createdDate";
    /// Object last-modified date property.
    pub const VIEW_LAST_MODIFIED_DATE: &str =
        "info:fedora/fedora-system:def/view#lastModifiedDate";
}
