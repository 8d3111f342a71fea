//! Unit tests for area assembly.

use super::*;
use crate::buffer::EntityKind;
use crate::segment::Winding;
use rstest::{fixture, rstest};

fn way(points: &[(i64, i32, i32)]) -> Vec<NodeRef> {
    points
        .iter()
        .map(|&(id, x, y)| NodeRef::new(id, Location::new(x, y)))
        .collect()
}

fn locations(ring: &Ring) -> Vec<(i32, i32)> {
    ring.nodes()
        .iter()
        .map(|node| (node.location().x(), node.location().y()))
        .collect()
}

#[fixture]
fn outer_square() -> Vec<NodeRef> {
    way(&[(1, 0, 0), (2, 10, 0), (3, 10, 10), (4, 0, 10), (1, 0, 0)])
}

#[fixture]
fn hole() -> Vec<NodeRef> {
    way(&[(5, 2, 2), (6, 2, 4), (7, 4, 4), (8, 4, 2), (5, 2, 2)])
}

#[rstest]
fn square_becomes_clockwise_outer(outer_square: Vec<NodeRef>) {
    let mut assembler = AreaAssembler::new();
    assembler.add_way(&outer_square).expect("add way");
    let area = assembler.assemble().expect("assemble");

    let [ring] = area.rings() else {
        panic!("expected one ring, got {:?}", area.rings());
    };
    assert_eq!(ring.role(), RingRole::Outer);
    assert_eq!(ring.winding(), Winding::Clockwise);
    assert_eq!(
        locations(ring),
        vec![(0, 0), (0, 10), (10, 10), (10, 0), (0, 0)]
    );
    assert_eq!(assembler.segment_count(), 0);
}

#[rstest]
fn hole_is_nested_counter_clockwise(outer_square: Vec<NodeRef>, hole: Vec<NodeRef>) {
    let mut assembler = AreaAssembler::new();
    assembler.add_way(&hole).expect("hole");
    assembler.add_way(&outer_square).expect("outer");
    let area = assembler.assemble().expect("assemble");

    let roles: Vec<_> = area.rings().iter().map(Ring::role).collect();
    assert_eq!(roles, vec![RingRole::Outer, RingRole::Inner]);
    let inner = area.inners_of(0).next().expect("inner ring");
    assert_eq!(inner.winding(), Winding::CounterClockwise);
    assert_eq!(
        locations(inner),
        vec![(2, 2), (4, 2), (4, 4), (2, 4), (2, 2)]
    );
    assert_eq!(area.outers().count(), 1);
}

#[rstest]
fn self_touching_way_yields_two_rings() {
    let figure_eight = way(&[
        (1, 0, 0),
        (2, 0, 2),
        (3, 2, 2),
        (4, 4, 4),
        (5, 4, 2),
        (3, 2, 2),
        (6, 2, 0),
        (1, 0, 0),
    ]);
    let mut assembler = AreaAssembler::new();
    assembler.add_way(&figure_eight).expect("add way");
    let area = assembler.assemble().expect("assemble");
    assert_eq!(area.rings().len(), 2);
    assert!(area.rings().iter().all(|ring| ring.role() == RingRole::Outer));
}

#[rstest]
fn crossing_way_is_split_into_two_outers() {
    let bowtie = way(&[(1, 0, 0), (2, 10, 10), (3, 10, 0), (4, 0, 10), (1, 0, 0)]);
    let mut assembler = AreaAssembler::new();
    assembler.add_way(&bowtie).expect("add way");
    let area = assembler.assemble().expect("assemble");

    let rings: Vec<_> = area.rings().iter().map(locations).collect();
    assert_eq!(
        rings,
        vec![
            vec![(0, 0), (0, 10), (5, 5), (0, 0)],
            vec![(5, 5), (10, 10), (10, 0), (5, 5)],
        ]
    );
    let crossing = area
        .rings()
        .first()
        .and_then(|ring| ring.nodes().get(2))
        .expect("crossing node");
    assert_eq!(crossing.id(), 0);
}

#[rstest]
fn output_ignores_input_order(outer_square: Vec<NodeRef>, hole: Vec<NodeRef>) {
    let write = |ways: &[Vec<NodeRef>]| {
        let mut assembler = AreaAssembler::new();
        for nodes in ways {
            assembler.add_way(nodes).expect("add way");
        }
        let mut buffer = EntityBuffer::new();
        assembler
            .assemble_into(&mut buffer, &EntityHeader::new(EntityKind::Area, 9), [("k", "v")])
            .expect("assemble");
        buffer.as_bytes().to_vec()
    };
    let reversed_hole: Vec<_> = hole.iter().rev().copied().collect();
    let forward = write(&[outer_square.clone(), hole]);
    let backward = write(&[reversed_hole, outer_square]);
    assert_eq!(forward, backward);
}

#[rstest]
fn repeated_way_is_a_duplicate(outer_square: Vec<NodeRef>) {
    let mut assembler = AreaAssembler::new();
    assembler.add_way(&outer_square).expect("first");
    assembler.add_way(&outer_square).expect("second");
    assert!(matches!(
        assembler.assemble(),
        Err(AssemblyError::Duplicate { .. })
    ));
}

#[rstest]
fn open_way_is_unclosed() {
    let mut assembler = AreaAssembler::new();
    assembler
        .add_way(&way(&[(1, 0, 0), (2, 5, 0), (3, 5, 5)]))
        .expect("add way");
    let error = assembler.assemble().expect_err("open ring");
    assert!(matches!(
        error,
        AssemblyError::Unclosed { location, .. } if location == Location::new(0, 0)
    ));
}

#[rstest]
fn undefined_location_is_rejected() {
    let mut assembler = AreaAssembler::new();
    let nodes = [
        NodeRef::new(1, Location::new(0, 0)),
        NodeRef::new(2, Location::undefined()),
    ];
    assert_eq!(
        assembler.add_way(&nodes),
        Err(AssemblyError::UndefinedLocation { node: 2 })
    );
}

#[rstest]
fn zero_length_steps_are_skipped() {
    let mut assembler = AreaAssembler::new();
    assembler
        .add_way(&way(&[(1, 0, 0), (2, 0, 0), (3, 4, 0)]))
        .expect("add way");
    assert_eq!(assembler.segment_count(), 1);
}

#[rstest]
fn segment_ceiling_is_enforced(outer_square: Vec<NodeRef>) {
    let mut assembler = AreaAssembler::new().with_max_segments(3);
    assert_eq!(
        assembler.add_way(&outer_square),
        Err(AssemblyError::TooManySegments { count: 4, limit: 3 })
    );
}

#[rstest]
fn written_area_reads_back(outer_square: Vec<NodeRef>, hole: Vec<NodeRef>) {
    let mut assembler = AreaAssembler::new();
    assembler.add_way(&outer_square).expect("outer");
    assembler.add_way(&hole).expect("hole");
    let area = assembler.assemble().expect("assemble");

    let mut buffer = EntityBuffer::new();
    let header = EntityHeader::new(EntityKind::Way, 42).with_user("builder");
    let handle = area
        .write_to(&mut buffer, &header, [("building", "yes")])
        .expect("write");
    let view = buffer.get(handle).expect("view");

    assert_eq!(view.kind(), EntityKind::Area);
    assert_eq!(view.id(), 42);
    assert_eq!(view.tag("building"), Some("yes"));
    assert_eq!(AssembledArea::from_view(&view), area);

    let polygons = area.to_multi_polygon();
    assert_eq!(polygons.0.len(), 1);
    assert_eq!(polygons.0.first().map(|polygon| polygon.interiors().len()), Some(1));
}
