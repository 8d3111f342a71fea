//! Closed rings and their orientation.

use geo::{Coord, LineString};

use crate::segment::Winding;
use crate::{Location, NodeRef};

/// Whether a ring bounds a polygon or a hole within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RingRole {
    /// Polygon boundary, wound clockwise.
    Outer,
    /// Hole, wound counter-clockwise.
    Inner,
}

impl RingRole {
    /// Orientation rings of this role are written with.
    #[must_use]
    pub const fn winding(self) -> Winding {
        match self {
            Self::Outer => Winding::Clockwise,
            Self::Inner => Winding::CounterClockwise,
        }
    }
}

/// A closed sequence of node references (`first == last`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ring {
    nodes: Vec<NodeRef>,
    role: RingRole,
    parent: Option<usize>,
}

impl Ring {
    pub(crate) const fn new(nodes: Vec<NodeRef>, role: RingRole, parent: Option<usize>) -> Self {
        Self {
            nodes,
            role,
            parent,
        }
    }

    /// Node references, closing node included.
    #[must_use]
    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    /// Outer or inner.
    #[must_use]
    pub const fn role(&self) -> RingRole {
        self.role
    }

    /// Index of the enclosing outer ring for inner rings.
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Orientation of the stored node order.
    #[must_use]
    pub fn winding(&self) -> Winding {
        winding_of(&self.nodes)
    }

    /// Smallest location on the ring; every ring starts there.
    #[must_use]
    pub fn min_location(&self) -> Location {
        self.nodes
            .first()
            .map_or_else(Location::undefined, NodeRef::location)
    }

    /// Closed line string in degrees.
    #[must_use]
    pub fn to_line_string(&self) -> LineString<f64> {
        self.nodes
            .iter()
            .map(|node| Coord::from(node.location()))
            .collect()
    }
}

/// Twice the signed area; positive for counter-clockwise rings.
pub(crate) fn doubled_signed_area(nodes: &[NodeRef]) -> i128 {
    nodes
        .windows(2)
        .map(|pair| match pair {
            [from, to] => {
                let (a, b) = (from.location(), to.location());
                i128::from(a.x()) * i128::from(b.y()) - i128::from(b.x()) * i128::from(a.y())
            }
            _ => 0,
        })
        .sum()
}

/// Orientation of a closed node sequence.
///
/// Decided by the turn at the minimum vertex, which lies on the convex hull.
/// Degenerate turns fall back to the signed area.
pub(crate) fn winding_of(nodes: &[NodeRef]) -> Winding {
    let turn = hull_turn(nodes).unwrap_or(0);
    let sign = if turn == 0 {
        doubled_signed_area(nodes)
    } else {
        turn
    };
    if sign > 0 {
        Winding::CounterClockwise
    } else {
        Winding::Clockwise
    }
}

fn hull_turn(nodes: &[NodeRef]) -> Option<i128> {
    let open = nodes.get(..nodes.len().checked_sub(1)?)?;
    let (index, vertex) = open
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| node.location())?;
    let prev = index
        .checked_sub(1)
        .and_then(|before| open.get(before))
        .or_else(|| open.last())?;
    let next = open.get(index + 1).or_else(|| open.first())?;
    let (p, v, n) = (prev.location(), vertex.location(), next.location());
    Some(
        (i128::from(v.x()) - i128::from(p.x())) * (i128::from(n.y()) - i128::from(v.y()))
            - (i128::from(v.y()) - i128::from(p.y())) * (i128::from(n.x()) - i128::from(v.x())),
    )
}

/// Rotate a closed ring to start at its minimum location and wind it.
pub(crate) fn normalise(mut nodes: Vec<NodeRef>, winding: Winding) -> Vec<NodeRef> {
    if winding_of(&nodes) != winding {
        nodes.reverse();
    }
    nodes.pop();
    let start = nodes
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| node.location())
        .map_or(0, |(index, _)| index);
    nodes.rotate_left(start);
    if let Some(first) = nodes.first().copied() {
        nodes.push(first);
    }
    nodes
}
