//! Polygon assembly from unordered way segments.
//!
//! An [`AreaAssembler`] collects the segments of one area and turns them
//! into closed rings:
//!
//! 1. segments are sorted and repeated edges rejected;
//! 2. crossing segments are split at their intersection points until no
//!    crossings remain;
//! 3. segments are linked into closed rings, splitting self-touching walks;
//! 4. rings are nested by containment, outers wound clockwise and inners
//!    counter-clockwise, each starting at its minimum location.
//!
//! The result depends only on the set of segments, never on the order they
//! were added in.

use thiserror::Error;

use crate::buffer::{BufferError, EntityBuffer, EntityHandle, EntityHeader};
use crate::{Location, NodeRef, Segment};

mod intersect;
mod link;
mod nesting;
mod ring;
mod writer;

pub use ring::{Ring, RingRole};

/// Reasons an area cannot be assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// The same edge was supplied twice.
    #[error("duplicate segment {segment}")]
    Duplicate {
        /// The repeated segment.
        segment: Segment,
    },
    /// A ring could not be closed at `location`.
    #[error("ring not closed at {location} (segment {segment})")]
    Unclosed {
        /// Endpoint shared by an odd number of segments.
        location: Location,
        /// A segment ending there.
        segment: Segment,
    },
    /// A node had no location.
    #[error("node {node} has no location")]
    UndefinedLocation {
        /// Identifier of the offending node.
        node: i64,
    },
    /// Crossings persisted after the maximum number of repair rounds.
    #[error("intersections remain after {rounds} repair rounds")]
    UnresolvedIntersections {
        /// Rounds attempted.
        rounds: usize,
    },
    /// The area has more segments than the configured ceiling.
    #[error("area has {count} segments, limit is {limit}")]
    TooManySegments {
        /// Segments collected or produced by splitting.
        count: usize,
        /// Configured ceiling.
        limit: usize,
    },
    /// Writing the area entity failed.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Collects the segments of one area and assembles them into rings.
///
/// # Examples
///
/// ```
/// use areaforge_core::{AreaAssembler, Location, NodeRef, RingRole};
///
/// # fn main() -> Result<(), areaforge_core::AssemblyError> {
/// let node = |id, x, y| NodeRef::new(id, Location::new(x, y));
/// let mut assembler = AreaAssembler::new();
/// assembler.add_way(&[node(1, 0, 0), node(2, 10, 0), node(3, 10, 10), node(4, 0, 10), node(1, 0, 0)])?;
///
/// let area = assembler.assemble()?;
/// assert_eq!(area.rings().len(), 1);
/// assert_eq!(area.rings()[0].role(), RingRole::Outer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AreaAssembler {
    segments: Vec<Segment>,
    max_segments: Option<usize>,
}

impl AreaAssembler {
    /// Create an assembler without a segment ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse areas with more than `limit` segments, including pieces
    /// produced by splitting crossings.
    #[must_use]
    pub const fn with_max_segments(mut self, limit: usize) -> Self {
        self.max_segments = Some(limit);
        self
    }

    /// Add the segments between consecutive nodes of a way.
    ///
    /// Consecutive nodes at the same location are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::UndefinedLocation`] for nodes without a
    /// location and [`AssemblyError::TooManySegments`] past the ceiling.
    pub fn add_way(&mut self, nodes: &[NodeRef]) -> Result<(), AssemblyError> {
        for pair in nodes.windows(2) {
            if let [a, b] = pair {
                self.add_segment(Segment::new(*a, *b))?;
            }
        }
        Ok(())
    }

    /// Add a single segment; degenerate segments are ignored.
    ///
    /// # Errors
    ///
    /// As for [`add_way`](Self::add_way).
    pub fn add_segment(&mut self, segment: Segment) -> Result<(), AssemblyError> {
        check_defined(segment.first())?;
        check_defined(segment.second())?;
        if segment.is_degenerate() {
            return Ok(());
        }
        if let Some(limit) = self.max_segments.filter(|limit| self.segments.len() >= *limit) {
            return Err(AssemblyError::TooManySegments {
                count: self.segments.len() + 1,
                limit,
            });
        }
        self.segments.push(segment);
        Ok(())
    }

    /// Segments collected so far.
    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Discard collected segments, keeping the ceiling.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Assemble the collected segments, leaving the assembler empty.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Duplicate`] for repeated edges,
    /// [`AssemblyError::Unclosed`] when a ring cannot be closed,
    /// [`AssemblyError::UnresolvedIntersections`] when crossings persist and
    /// [`AssemblyError::TooManySegments`] when splitting exceeds the ceiling.
    pub fn assemble(&mut self) -> Result<AssembledArea, AssemblyError> {
        let mut segments = std::mem::take(&mut self.segments);
        intersect::sort_unique(&mut segments)?;
        intersect::resolve(&mut segments, self.max_segments)?;
        let linked = link::link(&segments)?;
        Ok(AssembledArea {
            rings: nesting::nest(linked),
        })
    }

    /// Assemble and append the result to `buffer` as an area entity.
    ///
    /// The header's kind is replaced with [`EntityKind::Area`](crate::buffer::EntityKind::Area).
    ///
    /// # Errors
    ///
    /// As for [`assemble`](Self::assemble), plus [`AssemblyError::Buffer`]
    /// when the record cannot be written. Nothing is written on error.
    pub fn assemble_into<'t, I>(
        &mut self,
        buffer: &mut EntityBuffer,
        header: &EntityHeader<'_>,
        tags: I,
    ) -> Result<EntityHandle, AssemblyError>
    where
        I: IntoIterator<Item = (&'t str, &'t str)>,
    {
        let area = self.assemble()?;
        Ok(area.write_to(buffer, header, tags)?)
    }
}

const fn check_defined(node: &NodeRef) -> Result<(), AssemblyError> {
    if node.location().is_defined() {
        Ok(())
    } else {
        Err(AssemblyError::UndefinedLocation { node: node.id() })
    }
}

/// Rings produced by one assembly, each outer followed by its inners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssembledArea {
    rings: Vec<Ring>,
}

impl AssembledArea {
    /// All rings in output order.
    #[must_use]
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Whether assembly produced no ring.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Outer rings with their index into [`rings`](Self::rings).
    pub fn outers(&self) -> impl Iterator<Item = (usize, &Ring)> {
        self.rings
            .iter()
            .enumerate()
            .filter(|(_, ring)| ring.role() == RingRole::Outer)
    }

    /// Inner rings whose parent is the ring at `outer`.
    pub fn inners_of(&self, outer: usize) -> impl Iterator<Item = &Ring> {
        self.rings
            .iter()
            .filter(move |ring| ring.role() == RingRole::Inner && ring.parent() == Some(outer))
    }
}

#[cfg(test)]
mod tests;
