//! Classifying linked rings as outers and inners.

use std::cmp::Reverse;

use super::ring::{Ring, RingRole, doubled_signed_area, normalise};
use crate::{Location, NodeRef, Segment};

struct Candidate {
    nodes: Vec<NodeRef>,
    area: u128,
    min: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Inside,
    Outside,
    Boundary,
}

/// Assign roles and parents, wind every ring and order them for output.
///
/// Rings enclosing no area are dropped. The result lists each outer ring,
/// ordered by minimum location, followed by its inner rings.
pub(crate) fn nest(linked: Vec<Vec<NodeRef>>) -> Vec<Ring> {
    let mut candidates: Vec<Candidate> = linked
        .into_iter()
        .filter_map(|nodes| {
            let area = doubled_signed_area(&nodes).unsigned_abs();
            let min = nodes.iter().map(NodeRef::location).min()?;
            (area > 0).then_some(Candidate { nodes, area, min })
        })
        .collect();
    candidates.sort_by_key(|candidate| (Reverse(candidate.area), candidate.min));

    let mut placed: Vec<(RingRole, Option<usize>)> = Vec::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        let containers: Vec<usize> = candidates
            .iter()
            .take(index)
            .enumerate()
            .filter(|(_, larger)| contains(&larger.nodes, &candidate.nodes))
            .map(|(position, _)| position)
            .collect();
        let placement = if containers.len().is_multiple_of(2) {
            (RingRole::Outer, None)
        } else {
            (RingRole::Inner, containers.last().copied())
        };
        placed.push(placement);
    }

    emit_order(candidates, &placed)
}

fn emit_order(candidates: Vec<Candidate>, placed: &[(RingRole, Option<usize>)]) -> Vec<Ring> {
    let mut outers: Vec<(Location, usize)> = placed
        .iter()
        .zip(&candidates)
        .enumerate()
        .filter(|(_, ((role, _), _))| *role == RingRole::Outer)
        .map(|(index, (_, candidate))| (candidate.min, index))
        .collect();
    outers.sort_unstable();

    let mins: Vec<Location> = candidates.iter().map(|candidate| candidate.min).collect();
    let mut slots: Vec<Option<Vec<NodeRef>>> = candidates
        .into_iter()
        .map(|candidate| Some(candidate.nodes))
        .collect();

    let mut rings = Vec::with_capacity(slots.len());
    for (_, outer) in outers {
        let parent = rings.len();
        if let Some(nodes) = slots.get_mut(outer).and_then(Option::take) {
            rings.push(Ring::new(
                normalise(nodes, RingRole::Outer.winding()),
                RingRole::Outer,
                None,
            ));
        }
        let mut inners: Vec<(Location, usize)> = placed
            .iter()
            .enumerate()
            .filter(|(_, (role, container))| {
                *role == RingRole::Inner && *container == Some(outer)
            })
            .map(|(index, _)| (mins.get(index).copied().unwrap_or_default(), index))
            .collect();
        inners.sort_unstable();
        for (_, inner) in inners {
            if let Some(nodes) = slots.get_mut(inner).and_then(Option::take) {
                rings.push(Ring::new(
                    normalise(nodes, RingRole::Inner.winding()),
                    RingRole::Inner,
                    Some(parent),
                ));
            }
        }
    }
    rings
}

/// Whether `inner` lies within `outer`, rings being non-crossing.
///
/// Tests ring vertices first, then edge midpoints, skipping points on the
/// boundary. Coordinates are doubled so midpoints stay integral.
fn contains(outer: &[NodeRef], inner: &[NodeRef]) -> bool {
    let vertices = inner.iter().map(|node| doubled(node.location()));
    let midpoints = inner.windows(2).filter_map(|pair| match pair {
        [a, b] => Some(midpoint_doubled(a.location(), b.location())),
        _ => None,
    });
    vertices
        .chain(midpoints)
        .map(|point| classify(point, outer))
        .find(|placement| *placement != Placement::Boundary)
        == Some(Placement::Inside)
}

fn doubled(location: Location) -> (i128, i128) {
    (
        i128::from(location.x()) * 2,
        i128::from(location.y()) * 2,
    )
}

fn midpoint_doubled(a: Location, b: Location) -> (i128, i128) {
    (
        i128::from(a.x()) + i128::from(b.x()),
        i128::from(a.y()) + i128::from(b.y()),
    )
}

/// Even-odd test casting a ray towards positive `x`.
fn classify((px, py): (i128, i128), ring: &[NodeRef]) -> Placement {
    let mut inside = false;
    for pair in ring.windows(2) {
        let [a, b] = pair else {
            continue;
        };
        let upward = Segment::new(*a, *b).make_cw();
        let (fx, fy) = doubled(upward.from().location());
        let (tx, ty) = doubled(upward.to().location());
        let cross = (tx - fx) * (py - fy) - (px - fx) * (ty - fy);
        if cross == 0
            && (fx.min(tx)..=fx.max(tx)).contains(&px)
            && (fy..=ty).contains(&py)
        {
            return Placement::Boundary;
        }
        if fy <= py && py < ty && cross > 0 {
            inside = !inside;
        }
    }
    if inside {
        Placement::Inside
    } else {
        Placement::Outside
    }
}
