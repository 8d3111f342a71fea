//! Selection of the ways and relations that become areas.
//!
//! The relation pass registers multipolygon and boundary relations and the
//! ways they need. The geometry pass then keeps node lists for those ways
//! and registers closed, area-tagged ways as candidates of their own.

use std::collections::{HashMap, HashSet};

use areaforge_core::{EntityKind, EntityView};
use log::warn;

use super::ids::area_id;
use super::tags::{OwnedTags, area_tags, is_area_relation, is_area_way};

/// Edit metadata carried from a source object onto its area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Origin {
    pub(super) version: u32,
    pub(super) changeset: u32,
    pub(super) timestamp: u32,
    pub(super) uid: u32,
    pub(super) user: String,
}

impl Origin {
    fn of(view: &EntityView<'_>) -> Self {
        Self {
            version: view.version(),
            changeset: view.changeset(),
            timestamp: view.timestamp(),
            uid: view.uid(),
            user: view.user().to_owned(),
        }
    }
}

/// One area to assemble from the listed ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct AreaJob {
    pub(super) area_id: i64,
    pub(super) ways: Vec<i64>,
    pub(super) tags: OwnedTags,
    pub(super) origin: Origin,
}

/// Candidates gathered over both passes.
#[derive(Debug, Default)]
pub(super) struct AreaCandidates {
    jobs: Vec<AreaJob>,
    needed_ways: HashSet<i64>,
    way_nodes: HashMap<i64, Vec<i64>>,
}

impl AreaCandidates {
    /// Register `relation` when it describes an area.
    pub(super) fn collect_relation(&mut self, relation: &EntityView<'_>) {
        if !is_area_relation(relation.tags()) {
            return;
        }
        let Some(id) = area_id(EntityKind::Relation, relation.id()) else {
            return;
        };
        let ways: Vec<i64> = relation
            .members()
            .filter(|member| member.kind == EntityKind::Way)
            .map(|member| member.id)
            .collect();
        if ways.is_empty() {
            warn!("Skipped relation {}: no way members", relation.id());
            return;
        }
        self.needed_ways.extend(ways.iter().copied());
        self.jobs.push(AreaJob {
            area_id: id,
            ways,
            tags: area_tags(relation.tags()),
            origin: Origin::of(relation),
        });
    }

    /// Keep `way`'s node list when a relation needs it, and register the
    /// way itself when it is a closed area.
    pub(super) fn collect_way(&mut self, way: &EntityView<'_>) {
        let nodes: Vec<i64> = way.node_refs().map(|node| node.id()).collect();
        let candidate = is_closed(&nodes) && is_area_way(way.tags());
        let needed = self.needed_ways.contains(&way.id());
        if candidate && let Some(id) = area_id(EntityKind::Way, way.id()) {
            self.jobs.push(AreaJob {
                area_id: id,
                ways: vec![way.id()],
                tags: area_tags(way.tags()),
                origin: Origin::of(way),
            });
        }
        if candidate || needed {
            self.way_nodes.insert(way.id(), nodes);
        }
    }

    /// Number of areas registered so far.
    pub(super) const fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Node identifiers of `way`, if it was kept.
    pub(super) fn way_nodes(&self, way: i64) -> Option<&[i64]> {
        self.way_nodes.get(&way).map(Vec::as_slice)
    }

    /// Jobs ordered by area identifier.
    pub(super) fn take_jobs(&mut self) -> Vec<AreaJob> {
        let mut jobs = std::mem::take(&mut self.jobs);
        jobs.sort_by_key(|job| job.area_id);
        jobs
    }
}

/// A way closes when it returns to its first node after at least three
/// distinct hops.
fn is_closed(nodes: &[i64]) -> bool {
    nodes.len() >= 4 && nodes.first() == nodes.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use areaforge_core::test_support::MapFixture;
    use rstest::rstest;

    fn collect(fixture: MapFixture) -> AreaCandidates {
        let buffer = fixture.build();
        let mut candidates = AreaCandidates::default();
        for view in buffer.iter().filter(|view| view.kind() == EntityKind::Relation) {
            candidates.collect_relation(&view);
        }
        for view in buffer.iter().filter(|view| view.kind() == EntityKind::Way) {
            candidates.collect_way(&view);
        }
        candidates
    }

    #[rstest]
    #[case(&[1, 2, 3, 4, 1])]
    #[case(&[1, 2, 3, 1])]
    fn closed_tagged_way_becomes_candidate(#[case] nodes: &[i64]) {
        let mut candidates = collect(MapFixture::new().way(7, nodes, &[("building", "yes")]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates.way_nodes(7), Some(nodes));
        let jobs = candidates.take_jobs();
        let job = jobs.first().expect("one job");
        assert_eq!(job.area_id, 14);
        assert_eq!(job.ways, vec![7]);
    }

    #[rstest]
    #[case(&[1, 2, 1], &[("building", "yes")])]
    #[case(&[1, 2, 3, 4, 5], &[("building", "yes")])]
    #[case(&[1, 2, 3, 4, 1], &[("highway", "service")])]
    fn other_ways_are_ignored(#[case] nodes: &[i64], #[case] tags: &[(&str, &str)]) {
        let candidates = collect(MapFixture::new().way(7, nodes, tags));
        assert_eq!(candidates.len(), 0);
        assert_eq!(candidates.way_nodes(7), None);
    }

    #[rstest]
    fn relation_keeps_member_ways() {
        let mut candidates = collect(
            MapFixture::new()
                .way(10, &[1, 2, 3], &[])
                .way(11, &[3, 4, 1], &[])
                .way(12, &[5, 6], &[])
                .relation(
                    3,
                    &[
                        (EntityKind::Way, 10, "outer"),
                        (EntityKind::Way, 11, "outer"),
                        (EntityKind::Node, 1, "label"),
                    ],
                    &[("type", "multipolygon"), ("landuse", "meadow")],
                ),
        );
        assert!(candidates.way_nodes(10).is_some());
        assert!(candidates.way_nodes(11).is_some());
        assert!(candidates.way_nodes(12).is_none());

        let jobs = candidates.take_jobs();
        let job = jobs.first().expect("relation job");
        assert_eq!(job.area_id, 7);
        assert_eq!(job.ways, vec![10, 11]);
        assert_eq!(job.tags, vec![("landuse".to_owned(), "meadow".to_owned())]);
    }

    #[rstest]
    fn relation_without_ways_is_skipped() {
        let candidates = collect(MapFixture::new().relation(
            3,
            &[(EntityKind::Node, 1, "admin_centre")],
            &[("type", "boundary")],
        ));
        assert_eq!(candidates.len(), 0);
    }
}
