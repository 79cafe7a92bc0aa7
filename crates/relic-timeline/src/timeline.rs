use std::collections::BTreeMap;
use std::fmt;

use relic_foxml::DatastreamVersion;
use relic_types::{ObjectInfo, ObjectProperties};
use tracing::debug;

use crate::reference::ObjectReference;

/// One entry of an object's reconstructed timeline: every datastream version
/// created at exactly `version_date`.
#[derive(Clone)]
pub struct ObjectVersionReference<'a> {
    object: &'a ObjectReference,
    version_date: &'a str,
    changed: Vec<&'a DatastreamVersion>,
    index: usize,
    count: usize,
}

impl<'a> ObjectVersionReference<'a> {
    pub fn reference(&self) -> &'a ObjectReference {
        self.object
    }

    pub fn object(&self) -> &'a ObjectInfo {
        self.object.object()
    }

    pub fn properties(&self) -> &'a ObjectProperties {
        self.object.properties()
    }

    /// The shared creation timestamp, as written in the source.
    pub fn version_date(&self) -> &'a str {
        self.version_date
    }

    /// Datastream versions that changed in this entry.
    pub fn changed(&self) -> &[&'a DatastreamVersion] {
        &self.changed
    }

    /// Position in the timeline, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }
}

impl fmt::Debug for ObjectVersionReference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let changed: Vec<String> = self
            .changed
            .iter()
            .map(|v| format!("{}/{}", v.datastream().id(), v.id()))
            .collect();
        f.debug_struct("ObjectVersionReference")
            .field("pid", &self.object.pid())
            .field("version_date", &self.version_date)
            .field("index", &self.index)
            .field("changed", &changed)
            .finish()
    }
}

/// Regroup an object's datastream versions into its chronological timeline.
///
/// Versions are grouped by exact equality of their creation timestamp
/// string and the groups are ordered by plain string comparison. Legacy
/// timestamps are zero-padded ISO-8601, so this is chronological order.
/// Within one entry, versions keep datastream document order.
pub fn reconstruct(reference: &ObjectReference) -> Vec<ObjectVersionReference<'_>> {
    let mut by_date: BTreeMap<&str, Vec<&DatastreamVersion>> = BTreeMap::new();
    for version in reference.all_versions() {
        by_date.entry(version.created()).or_default().push(version);
    }

    let count = by_date.len();
    let timeline: Vec<ObjectVersionReference<'_>> = by_date
        .into_iter()
        .enumerate()
        .map(|(index, (version_date, changed))| ObjectVersionReference {
            object: reference,
            version_date,
            changed,
            index,
            count,
        })
        .collect();
    debug!(
        pid = reference.pid(),
        versions = reference.version_count(),
        entries = timeline.len(),
        "reconstructed timeline"
    );
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use proptest::prelude::*;
    use relic_content::MemoryContent;
    use relic_types::{ControlGroup, DatastreamInfo, DatastreamState};

    fn reference_with(versions: &[(&str, &str, &str)]) -> ObjectReference {
        let object = Arc::new(ObjectInfo::new("demo:1", None));
        let mut reference = ObjectReference::new(Arc::clone(&object), ObjectProperties::new());
        for (dsid, vid, created) in versions {
            let info = Arc::new(DatastreamInfo::new(
                Arc::clone(&object),
                *dsid,
                ControlGroup::InlineXml,
                DatastreamState::Active,
                true,
            ));
            reference
                .add_version(DatastreamVersion::new(
                    info,
                    *vid,
                    *created,
                    Box::new(MemoryContent::new(Vec::new())),
                ))
                .unwrap();
        }
        reference
    }

    fn ids(entry: &ObjectVersionReference<'_>) -> Vec<String> {
        entry
            .changed()
            .iter()
            .map(|v| format!("{}/{}", v.datastream().id(), v.id()))
            .collect()
    }

    // ---------------------------------------------------------------
    // Examples
    // ---------------------------------------------------------------

    #[test]
    fn empty_object_has_empty_timeline() {
        let reference = reference_with(&[]);
        assert!(reconstruct(&reference).is_empty());
    }

    #[test]
    fn groups_by_exact_timestamp() {
        let reference = reference_with(&[
            ("AUDIT", "AUDIT.0", "2008-07-02T05:09:42.015Z"),
            ("DC", "DC1.0", "2008-07-02T05:09:42.015Z"),
            ("DS1", "DS1.0", "2008-07-02T05:09:43.234Z"),
            ("DS1", "DS1.1", "2008-07-02T05:09:44.000Z"),
            ("DS2", "DS2.0", "2008-07-02T05:09:45.000Z"),
        ]);
        let timeline = reference.timeline();
        assert_eq!(timeline.len(), 4);
        assert_eq!(ids(&timeline[0]), vec!["AUDIT/AUDIT.0", "DC/DC1.0"]);
        assert_eq!(ids(&timeline[1]), vec!["DS1/DS1.0"]);
        assert_eq!(timeline[3].version_date(), "2008-07-02T05:09:45.000Z");
        assert!(timeline[0].is_first() && !timeline[0].is_last());
        assert!(timeline[3].is_last() && !timeline[3].is_first());
        assert_eq!(timeline[2].index(), 2);
    }

    #[test]
    fn sorts_out_of_document_order() {
        let reference = reference_with(&[
            ("DS1", "DS1.1", "2012-01-01T00:00:00.000Z"),
            ("DS1", "DS1.0", "2010-01-01T00:00:00.000Z"),
        ]);
        let dates: Vec<&str> = reference.timeline().iter().map(|e| e.version_date()).collect();
        assert_eq!(dates, vec!["2010-01-01T00:00:00.000Z", "2012-01-01T00:00:00.000Z"]);
    }

    #[test]
    fn differently_written_instants_are_distinct_entries() {
        let reference = reference_with(&[
            ("DS1", "DS1.0", "2010-01-01T00:00:00Z"),
            ("DS2", "DS2.0", "2010-01-01T00:00:00.000Z"),
        ]);
        assert_eq!(reference.timeline().len(), 2);
    }

    #[test]
    fn single_entry_is_first_and_last() {
        let reference = reference_with(&[("DS1", "DS1.0", "2010")]);
        let timeline = reference.timeline();
        assert!(timeline[0].is_first());
        assert!(timeline[0].is_last());
    }

    // ---------------------------------------------------------------
    // Properties
    // ---------------------------------------------------------------

    fn arb_versions() -> impl Strategy<Value = Vec<(String, String)>> {
        let datastream = prop::sample::select(vec!["AUDIT", "DC", "DS1", "DS2", "RELS-EXT"]);
        let day = 1u32..=9;
        prop::collection::vec((datastream, day), 0..40).prop_map(|picks| {
            picks
                .into_iter()
                .map(|(ds, day)| (ds.to_string(), format!("2010-01-0{day}T00:00:00.000Z")))
                .collect()
        })
    }

    fn build(picks: &[(String, String)]) -> ObjectReference {
        let owned: Vec<(String, String, String)> = picks
            .iter()
            .enumerate()
            .map(|(i, (ds, date))| (ds.clone(), format!("{ds}.{i}"), date.clone()))
            .collect();
        let borrowed: Vec<(&str, &str, &str)> = owned
            .iter()
            .map(|(a, b, c)| (a.as_str(), b.as_str(), c.as_str()))
            .collect();
        reference_with(&borrowed)
    }

    proptest! {
        #[test]
        fn timeline_partitions_versions(picks in arb_versions()) {
            let reference = build(&picks);
            let timeline = reference.timeline();

            let mut seen = BTreeSet::new();
            let mut total = 0;
            for entry in &timeline {
                for version in entry.changed() {
                    prop_assert_eq!(version.created(), entry.version_date());
                    seen.insert((version.datastream().id().to_string(), version.id().to_string()));
                    total += 1;
                }
            }
            let expected: BTreeSet<(String, String)> = reference
                .all_versions()
                .map(|v| (v.datastream().id().to_string(), v.id().to_string()))
                .collect();
            prop_assert_eq!(total, reference.version_count());
            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn timeline_is_ordered(picks in arb_versions()) {
            let reference = build(&picks);
            let timeline = reference.timeline();
            for pair in timeline.windows(2) {
                prop_assert!(pair[0].version_date() < pair[1].version_date());
            }
            for (i, entry) in timeline.iter().enumerate() {
                prop_assert_eq!(entry.index(), i);
                prop_assert_eq!(entry.is_first(), i == 0);
                prop_assert_eq!(entry.is_last(), i + 1 == timeline.len());
                prop_assert!(!entry.changed().is_empty());
            }
        }
    }
}
