//! Unit tests for the two-pass area builder.

use std::io;

use areaforge_core::test_support::{MapFixture, VecSource};
use areaforge_core::{AssembledArea, RingRole};
use rstest::{fixture, rstest};

use super::*;

const UNIT: i32 = 1_000_000;

/// Square nodes `first..first + 4` at `(x, y)` with side `size` units.
fn square_nodes(fixture: MapFixture, first: i64, x: i32, y: i32, size: i32) -> MapFixture {
    fixture
        .node(first, x * UNIT, y * UNIT)
        .node(first + 1, (x + size) * UNIT, y * UNIT)
        .node(first + 2, (x + size) * UNIT, (y + size) * UNIT)
        .node(first + 3, x * UNIT, (y + size) * UNIT)
}

fn options(workers: usize) -> AreaOptions {
    AreaOptions {
        workers,
        max_segments: None,
    }
}

fn run(extract: &EntityBuffer, options: &AreaOptions) -> AreaBuildReport {
    build_areas(
        VecSource::new([extract.clone()]),
        VecSource::new([extract.clone()]),
        options,
    )
    .expect("build succeeds")
}

fn single_area(report: &AreaBuildReport) -> (i64, AssembledArea) {
    let mut areas = report.areas.iter();
    let view = areas.next().expect("one area");
    assert!(areas.next().is_none(), "exactly one area");
    (view.id(), AssembledArea::from_view(&view))
}

#[fixture]
fn building() -> EntityBuffer {
    square_nodes(MapFixture::new(), 1, 0, 0, 10)
        .way(5, &[1, 2, 3, 4, 1], &[("building", "yes"), ("name", "Depot")])
        .build()
}

#[fixture]
fn lake_with_island() -> EntityBuffer {
    let nodes = square_nodes(square_nodes(MapFixture::new(), 1, 0, 0, 10), 11, 4, 4, 2);
    nodes
        .way(20, &[1, 2, 3], &[])
        .way(21, &[3, 4, 1], &[])
        .way(22, &[11, 12, 13, 14, 11], &[])
        .relation(
            3,
            &[
                (EntityKind::Way, 20, "outer"),
                (EntityKind::Way, 21, "outer"),
                (EntityKind::Way, 22, "inner"),
            ],
            &[("type", "multipolygon"), ("natural", "water")],
        )
        .build()
}

#[rstest]
fn closed_way_becomes_area(building: EntityBuffer) {
    let report = run(&building, &options(1));
    let (id, area) = single_area(&report);
    assert_eq!(id, 10);
    assert_eq!(area.rings().len(), 1);
    let ring = area.rings().first().expect("outer ring");
    assert_eq!(ring.role(), RingRole::Outer);
    assert_eq!(ring.winding(), RingRole::Outer.winding());

    let view = report.areas.iter().next().expect("area view");
    assert_eq!(view.tag("building"), Some("yes"));
    assert_eq!(view.tag("name"), Some("Depot"));

    let summary = &report.summary;
    assert_eq!(
        (summary.nodes, summary.ways, summary.candidates, summary.built),
        (4, 1, 1, 1)
    );
}

#[rstest]
fn multipolygon_relation_nests_its_inner_way(lake_with_island: EntityBuffer) {
    let report = run(&lake_with_island, &options(2));
    let (id, area) = single_area(&report);
    assert_eq!(id, 7);
    let roles: Vec<_> = area.rings().iter().map(|ring| ring.role()).collect();
    assert_eq!(roles, vec![RingRole::Outer, RingRole::Inner]);

    let view = report.areas.iter().next().expect("area view");
    assert_eq!(view.tag("natural"), Some("water"));
    assert_eq!(view.tag("type"), None);
    assert_eq!(report.summary.relations, 1);
}

#[rstest]
fn missing_node_is_a_lookup_miss() {
    let extract = MapFixture::new()
        .node(1, 0, 0)
        .node(2, UNIT, 0)
        .node(3, UNIT, UNIT)
        .way(5, &[1, 2, 3, 4, 1], &[("landuse", "grass")])
        .build();
    let report = run(&extract, &options(1));
    assert!(report.areas.is_empty());
    assert_eq!(report.summary.lookup_misses, 1);
    assert_eq!(report.summary.built, 0);
}

#[rstest]
fn missing_member_way_is_a_lookup_miss() {
    let extract = square_nodes(MapFixture::new(), 1, 0, 0, 10)
        .way(20, &[1, 2, 3, 4, 1], &[])
        .relation(
            3,
            &[(EntityKind::Way, 20, "outer"), (EntityKind::Way, 99, "outer")],
            &[("type", "multipolygon"), ("landuse", "forest")],
        )
        .build();
    let report = run(&extract, &options(1));
    assert_eq!(report.summary.lookup_misses, 1);
    assert!(report.areas.is_empty());
}

#[rstest]
fn unclosed_relation_is_malformed() {
    let extract = square_nodes(MapFixture::new(), 1, 0, 0, 10)
        .way(20, &[1, 2, 3, 4], &[])
        .relation(
            3,
            &[(EntityKind::Way, 20, "outer")],
            &[("type", "multipolygon"), ("landuse", "forest")],
        )
        .build();
    let report = run(&extract, &options(1));
    assert_eq!(report.summary.malformed, 1);
    assert_eq!(report.summary.built, 0);
}

#[rstest]
fn segment_ceiling_marks_large_areas_malformed(building: EntityBuffer) {
    let bounded = AreaOptions {
        workers: 1,
        max_segments: Some(3),
    };
    let report = run(&building, &bounded);
    assert_eq!(report.summary.malformed, 1);
    assert!(report.areas.is_empty());
}

#[rstest]
fn output_does_not_depend_on_worker_count() {
    let mut fixture = MapFixture::new();
    for index in 0..6_i32 {
        let first = i64::from(index) * 10 + 1;
        fixture = square_nodes(fixture, first, index * 20, 0, 10).way(
            i64::from(index) + 100,
            &[first, first + 1, first + 2, first + 3, first],
            &[("building", "yes")],
        );
    }
    let extract = fixture.build();

    let single = run(&extract, &options(1));
    let parallel = run(&extract, &options(4));
    assert_eq!(single.summary, parallel.summary);
    assert_eq!(single.areas.as_bytes(), parallel.areas.as_bytes());
    let ids: Vec<_> = parallel.areas.iter().map(|view| view.id()).collect();
    assert_eq!(ids, vec![200, 202, 204, 206, 208, 210]);
}

#[rstest]
fn summary_reports_duplicates_and_bounds() {
    let extract = MapFixture::new()
        .node(1, -10_000_000, 5_000_000)
        .node(2, 20_000_000, -5_000_000)
        .node(2, 30_000_000, 0)
        .build();
    let report = run(&extract, &options(1));
    assert_eq!(report.summary.nodes, 3);
    assert_eq!(report.summary.duplicate_ids, 1);
    let bounds = report.summary.bounds.expect("nodes give bounds");
    assert_eq!(bounds.min(), Coord { x: -1.0, y: -0.5 });
    assert_eq!(bounds.max(), Coord { x: 3.0, y: 0.5 });
}

#[derive(Debug, Default)]
struct BrokenSource;

impl BufferSource for BrokenSource {
    type Error = io::Error;

    fn read(&mut self) -> Result<EntityBuffer, Self::Error> {
        Err(io::Error::other("truncated block"))
    }
}

#[rstest]
#[case(Pass::Relations)]
#[case(Pass::Geometry)]
fn source_failures_name_their_pass(#[case] failing: Pass) {
    let result = match failing {
        Pass::Relations => build_areas(BrokenSource, VecSource::default(), &options(1)),
        Pass::Geometry => build_areas(VecSource::default(), BrokenSource, &options(1)),
    };
    match result {
        Err(AreaBuildError::Source { pass, source }) => {
            assert_eq!(pass, failing);
            assert_eq!(source.to_string(), "truncated block");
        }
        other => panic!("expected a source error, got {other:?}"),
    }
}

#[rstest]
fn zero_workers_still_builds(building: EntityBuffer) {
    let report = run(&building, &options(0));
    assert_eq!(report.summary.built, 1);
}
