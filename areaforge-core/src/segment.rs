//! Way segments and the primitives the intersection sweep relies on.
//!
//! A [`Segment`] is canonical: its endpoints are stored in [`Location`]
//! order, so the same edge read from either direction compares equal and
//! sorts identically. Direction only exists in the [`OrientedSegment`] view
//! produced on demand, which never feeds back into equality.

use std::fmt;

use crate::{Location, NodeRef};

/// Ring orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Winding {
    /// Clockwise with `y` pointing north.
    Clockwise,
    /// Counter-clockwise with `y` pointing north.
    CounterClockwise,
}

impl Winding {
    /// The opposite orientation.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// An undirected edge between two located nodes.
///
/// # Examples
///
/// ```
/// use areaforge_core::{Location, NodeRef, Segment};
///
/// let a = NodeRef::new(1, Location::new(5, 0));
/// let b = NodeRef::new(2, Location::new(0, 5));
/// let segment = Segment::new(a, b);
/// assert_eq!(segment.first().id(), 2);
/// assert_eq!(segment, Segment::new(b, a));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    first: NodeRef,
    second: NodeRef,
}

impl Segment {
    /// Build the canonical segment joining `a` and `b`.
    #[must_use]
    pub fn new(a: NodeRef, b: NodeRef) -> Self {
        if b < a {
            Self {
                first: b,
                second: a,
            }
        } else {
            Self {
                first: a,
                second: b,
            }
        }
    }

    /// Endpoint with the smaller location.
    #[must_use]
    pub const fn first(&self) -> &NodeRef {
        &self.first
    }

    /// Endpoint with the larger location.
    #[must_use]
    pub const fn second(&self) -> &NodeRef {
        &self.second
    }

    /// Both endpoints share a location.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.first == self.second
    }

    /// Whether `location` is one of the endpoints.
    #[must_use]
    pub fn has_endpoint(&self, location: Location) -> bool {
        self.first.location() == location || self.second.location() == location
    }

    /// View running from the lower to the higher `y`.
    ///
    /// This is the direction a clockwise ring takes on its western side.
    #[must_use]
    pub fn make_cw(&self) -> OrientedSegment {
        if self.first.location().y() > self.second.location().y() {
            OrientedSegment::new(self.second, self.first)
        } else {
            OrientedSegment::new(self.first, self.second)
        }
    }

    /// View running from the higher to the lower `y`.
    #[must_use]
    pub fn make_ccw(&self) -> OrientedSegment {
        if self.first.location().y() < self.second.location().y() {
            OrientedSegment::new(self.second, self.first)
        } else {
            OrientedSegment::new(self.first, self.second)
        }
    }

    /// View leaving from `start`, or `None` if `start` is not an endpoint.
    #[must_use]
    pub fn leaving(&self, start: Location) -> Option<OrientedSegment> {
        if self.first.location() == start {
            Some(OrientedSegment::new(self.first, self.second))
        } else if self.second.location() == start {
            Some(OrientedSegment::new(self.second, self.first))
        } else {
            None
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}--{}", self.first, self.second)
    }
}

/// A segment with a walking direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedSegment {
    from: NodeRef,
    to: NodeRef,
}

impl OrientedSegment {
    const fn new(from: NodeRef, to: NodeRef) -> Self {
        Self { from, to }
    }

    /// Start of the walk.
    #[must_use]
    pub const fn from(&self) -> &NodeRef {
        &self.from
    }

    /// End of the walk.
    #[must_use]
    pub const fn to(&self) -> &NodeRef {
        &self.to
    }

    /// The same edge walked the other way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    /// Canonical segment underlying this view.
    #[must_use]
    pub fn segment(&self) -> Segment {
        Segment::new(self.from, self.to)
    }
}

/// Whether `a` lies wholly to the right of `b` on the x axis.
///
/// Only meaningful once segments are sorted: with `b` before `a` the sweep
/// can stop at the first `a` for which this holds.
#[must_use]
pub fn outside_x_range(a: &Segment, b: &Segment) -> bool {
    a.first().location().x() > b.second().location().x()
}

/// Whether the y extents of the two segments overlap (inclusive).
#[must_use]
pub fn y_range_overlap(a: &Segment, b: &Segment) -> bool {
    let (a_min, a_max) = y_extent(a);
    let (b_min, b_max) = y_extent(b);
    a_min <= b_max && b_min <= a_max
}

fn y_extent(segment: &Segment) -> (i32, i32) {
    let y1 = segment.first().location().y();
    let y2 = segment.second().location().y();
    (y1.min(y2), y1.max(y2))
}

/// Intersection point of two segments, or [`Location::undefined`].
///
/// Segments sharing an endpoint never intersect here, nor do parallel or
/// collinear ones. Parameters are bounded against the denominator in its own
/// sign before any division.
///
/// # Examples
///
/// ```
/// use areaforge_core::{Location, NodeRef, Segment, calculate_intersection};
///
/// let node = |x, y| NodeRef::new(0, Location::new(x, y));
/// let a = Segment::new(node(0, 0), node(10, 10));
/// let b = Segment::new(node(0, 10), node(10, 0));
/// assert_eq!(calculate_intersection(&a, &b), Location::new(5, 5));
/// ```
#[must_use]
pub fn calculate_intersection(a: &Segment, b: &Segment) -> Location {
    if a.first() == b.first()
        || a.first() == b.second()
        || a.second() == b.first()
        || a.second() == b.second()
    {
        return Location::undefined();
    }

    let a1 = a.first().location();
    let a2 = a.second().location();
    let b1 = b.first().location();
    let b2 = b.second().location();

    let adx = i128::from(a2.x()) - i128::from(a1.x());
    let ady = i128::from(a2.y()) - i128::from(a1.y());
    let bdx = i128::from(b2.x()) - i128::from(b1.x());
    let bdy = i128::from(b2.y()) - i128::from(b1.y());
    let abx = i128::from(a1.x()) - i128::from(b1.x());
    let aby = i128::from(a1.y()) - i128::from(b1.y());

    let denom = bdy * adx - bdx * ady;
    if denom == 0 {
        return Location::undefined();
    }
    let nume_a = bdx * aby - bdy * abx;
    let nume_b = adx * aby - ady * abx;

    let within = if denom > 0 {
        (0..=denom).contains(&nume_a) && (0..=denom).contains(&nume_b)
    } else {
        (denom..=0).contains(&nume_a) && (denom..=0).contains(&nume_b)
    };
    if !within {
        return Location::undefined();
    }
    interpolate(a1, adx, ady, nume_a, denom)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "the crossing lies inside both segments' bounding boxes, so the rounded value fits in i32"
)]
fn interpolate(origin: Location, dx: i128, dy: i128, nume: i128, denom: i128) -> Location {
    let ua = nume as f64 / denom as f64;
    let ix = (f64::from(origin.x()) + ua * dx as f64).round() as i64;
    let iy = (f64::from(origin.y()) + ua * dy as f64).round() as i64;
    match (i32::try_from(ix), i32::try_from(iy)) {
        (Ok(x), Ok(y)) => Location::new(x, y),
        _ => Location::undefined(),
    }
}
