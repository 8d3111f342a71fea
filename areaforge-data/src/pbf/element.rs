//! Conversion of decoded PBF elements into entity records.

use areaforge_core::buffer::{EntityHeader, EntityKind, Member};
use areaforge_core::{BufferError, EntityBuffer, EntityFilter, Location, NodeRef};
use log::warn;
use osmpbf::{DenseNode, Element, Info, Node, RelMemberType, Relation, Way};

/// Edit metadata shared by every element kind.
#[derive(Debug, Clone, Copy)]
struct Metadata<'a> {
    version: u32,
    changeset: u32,
    timestamp: u32,
    uid: u32,
    visible: bool,
    user: &'a str,
}

impl<'a> Metadata<'a> {
    fn from_info(info: &Info<'a>) -> Self {
        Self {
            version: info.version().map_or(0, clamp_u32),
            changeset: info.changeset().map_or(0, clamp_u32),
            timestamp: info.milli_timestamp().map_or(0, seconds),
            uid: info.uid().map_or(0, clamp_u32),
            visible: info.visible(),
            user: info.user().and_then(Result::ok).unwrap_or_default(),
        }
    }

    fn from_dense(node: &'a DenseNode<'a>) -> Self {
        node.info().map_or(
            Self {
                version: 0,
                changeset: 0,
                timestamp: 0,
                uid: 0,
                visible: true,
                user: "",
            },
            |info| Self {
                version: clamp_u32(info.version()),
                changeset: clamp_u32(info.changeset()),
                timestamp: seconds(info.milli_timestamp()),
                uid: clamp_u32(info.uid()),
                visible: !info.deleted(),
                user: info.user().unwrap_or_default(),
            },
        )
    }

    const fn header(self, kind: EntityKind, id: i64) -> EntityHeader<'a> {
        let mut header = EntityHeader::new(kind, id).with_user(self.user);
        header.version = self.version;
        header.changeset = self.changeset;
        header.timestamp = self.timestamp;
        header.uid = self.uid;
        header.visible = self.visible;
        header
    }
}

/// Negative or oversized values have no meaning in the record header.
fn clamp_u32<T>(value: T) -> u32
where
    u32: TryFrom<T>,
{
    u32::try_from(value).unwrap_or(0)
}

fn seconds(millis: i64) -> u32 {
    millis.checked_div(1_000).map_or(0, clamp_u32)
}

/// Append `element` to `buffer` when the filter accepts its kind.
///
/// Entities whose tags cannot be stored are skipped with a warning.
///
/// # Errors
///
/// Propagates buffer failures other than rejected tag text.
pub(super) fn append(
    buffer: &mut EntityBuffer,
    element: &Element<'_>,
    filter: EntityFilter,
) -> Result<(), BufferError> {
    let outcome = match element {
        Element::Node(node) if filter.nodes => append_node(buffer, node),
        Element::DenseNode(node) if filter.nodes => append_dense_node(buffer, node),
        Element::Way(way) if filter.ways => append_way(buffer, way),
        Element::Relation(relation) if filter.relations => append_relation(buffer, relation),
        _ => Ok(()),
    };
    match outcome {
        Err(BufferError::EmbeddedNul { text }) => {
            warn!("Skipped OSM element with a NUL byte in tag text {text:?}");
            Ok(())
        }
        other => other,
    }
}

fn append_node(buffer: &mut EntityBuffer, node: &Node<'_>) -> Result<(), BufferError> {
    let location = Location::new(node.decimicro_lon(), node.decimicro_lat());
    let header = Metadata::from_info(&node.info())
        .header(EntityKind::Node, node.id())
        .with_location(location);
    let mut builder = buffer.builder(&header)?;
    builder.add_tags(node.tags())?;
    builder.commit()?;
    Ok(())
}

fn append_dense_node<'a>(
    buffer: &mut EntityBuffer,
    node: &'a DenseNode<'a>,
) -> Result<(), BufferError> {
    let location = Location::new(node.decimicro_lon(), node.decimicro_lat());
    let header = Metadata::from_dense(node)
        .header(EntityKind::Node, node.id())
        .with_location(location);
    let mut builder = buffer.builder(&header)?;
    builder.add_tags(node.tags())?;
    builder.commit()?;
    Ok(())
}

fn append_way(buffer: &mut EntityBuffer, way: &Way<'_>) -> Result<(), BufferError> {
    let header = Metadata::from_info(&way.info()).header(EntityKind::Way, way.id());
    let refs: Vec<NodeRef> = way
        .refs()
        .map(|id| NodeRef::new(id, Location::undefined()))
        .collect();
    let mut builder = buffer.builder(&header)?;
    builder.add_tags(way.tags())?;
    builder.add_node_refs(&refs)?;
    builder.commit()?;
    Ok(())
}

fn append_relation(buffer: &mut EntityBuffer, relation: &Relation<'_>) -> Result<(), BufferError> {
    let header = Metadata::from_info(&relation.info()).header(EntityKind::Relation, relation.id());
    let members = relation.members().map(|member| Member {
        kind: member_kind(&member.member_type),
        id: member.member_id,
        role: member.role().unwrap_or_default(),
    });
    let mut builder = buffer.builder(&header)?;
    builder.add_tags(relation.tags())?;
    builder.add_members(members)?;
    builder.commit()?;
    Ok(())
}

const fn member_kind(kind: &RelMemberType) -> EntityKind {
    match kind {
        RelMemberType::Node => EntityKind::Node,
        RelMemberType::Way => EntityKind::Way,
        RelMemberType::Relation => EntityKind::Relation,
    }
}
