//! Object accumulation and version reconstruction.
//!
//! The decoder reports datastream versions one at a time. [`ObjectReferenceBuilder`]
//! collects them into an [`ObjectReference`], a random-access view of the
//! whole object, and [`reconstruct`] regroups that view into the object's
//! chronological timeline: one [`ObjectVersionReference`] per distinct
//! creation timestamp, oldest first.

pub mod reference;
pub mod timeline;

pub use reference::{ObjectReference, ObjectReferenceBuilder};
pub use timeline::{reconstruct, ObjectVersionReference};
