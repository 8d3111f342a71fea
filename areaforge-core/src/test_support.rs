//! Test-only builders for entity buffers and an in-memory [`BufferSource`].

use std::collections::VecDeque;
use std::convert::Infallible;

use crate::buffer::{EntityBuffer, EntityBuilder, EntityHeader, EntityKind, Member};
use crate::{BufferSource, Location, NodeRef};

/// Source replaying prepared buffers, then signalling end of input.
#[derive(Debug, Default, Clone)]
pub struct VecSource {
    buffers: VecDeque<EntityBuffer>,
}

impl VecSource {
    /// Replay `buffers` in order.
    pub fn new<I>(buffers: I) -> Self
    where
        I: IntoIterator<Item = EntityBuffer>,
    {
        Self {
            buffers: buffers.into_iter().collect(),
        }
    }
}

impl BufferSource for VecSource {
    type Error = Infallible;

    fn read(&mut self) -> Result<EntityBuffer, Self::Error> {
        Ok(self.buffers.pop_front().unwrap_or_default())
    }
}

/// Fluent builder for small map extracts.
///
/// Node coordinates are given in fixed-precision units.
#[derive(Debug, Default)]
pub struct MapFixture {
    buffer: EntityBuffer,
}

#[expect(
    clippy::expect_used,
    reason = "fixtures are written into an unbounded buffer and should fail fast"
)]
impl MapFixture {
    /// Start an empty extract.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    #[must_use]
    pub fn node(mut self, id: i64, x: i32, y: i32) -> Self {
        self.buffer
            .builder(&EntityHeader::new(EntityKind::Node, id).with_location(Location::new(x, y)))
            .and_then(EntityBuilder::commit)
            .expect("write node");
        self
    }

    /// Add a way referencing `nodes` by identifier.
    #[must_use]
    pub fn way(mut self, id: i64, nodes: &[i64], tags: &[(&str, &str)]) -> Self {
        let refs: Vec<_> = nodes
            .iter()
            .map(|node| NodeRef::new(*node, Location::undefined()))
            .collect();
        let mut way = self
            .buffer
            .builder(&EntityHeader::new(EntityKind::Way, id))
            .expect("start way");
        way.add_tags(tags.iter().copied()).expect("way tags");
        way.add_node_refs(&refs).expect("way nodes");
        way.commit().expect("commit way");
        self
    }

    /// Add a relation with `(kind, id, role)` members.
    #[must_use]
    pub fn relation(
        mut self,
        id: i64,
        members: &[(EntityKind, i64, &str)],
        tags: &[(&str, &str)],
    ) -> Self {
        let mut relation = self
            .buffer
            .builder(&EntityHeader::new(EntityKind::Relation, id))
            .expect("start relation");
        relation
            .add_members(members.iter().map(|&(kind, member_id, role)| Member {
                kind,
                id: member_id,
                role,
            }))
            .expect("relation members");
        relation
            .add_tags(tags.iter().copied())
            .expect("relation tags");
        relation.commit().expect("commit relation");
        self
    }

    /// Finish the extract.
    #[must_use]
    pub fn build(self) -> EntityBuffer {
        self.buffer
    }
}

/// Closed square ring of `size` units with its minimum corner at `(x, y)`.
///
/// Node identifiers start at `first_id` and the ring is wound
/// counter-clockwise, as editors commonly draw it.
#[must_use]
pub fn square(first_id: i64, x: i32, y: i32, size: i32) -> Vec<NodeRef> {
    let corners = [(x, y), (x + size, y), (x + size, y + size), (x, y + size)];
    let mut ring: Vec<_> = corners
        .iter()
        .zip(first_id..)
        .map(|(&(cx, cy), id)| NodeRef::new(id, Location::new(cx, cy)))
        .collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}
