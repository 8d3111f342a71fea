//! Read-only access to committed records.

use std::iter::FusedIterator;
use std::slice::ChunksExact;

use bytes::Buf;

use super::EntityHandle;
use super::layout::{
    CHANGESET_OFFSET, EntityKind, FLAG_VISIBLE, FLAGS_OFFSET, ID_OFFSET, ITEM_HEADER_SIZE,
    KIND_OFFSET, MEMBER_ENTRY_HEADER_SIZE, NODE_REF_ENTRY_SIZE, NODE_X_OFFSET, NODE_Y_OFFSET,
    SIZE_OFFSET, SubItemKind, TIMESTAMP_OFFSET, UID_OFFSET, USER_LEN_OFFSET, VERSION_OFFSET,
    padded_length, read_i32, read_i64, read_u16, read_u32, widen,
};
use crate::area::RingRole;
use crate::{Location, NodeRef};

/// Borrowed view of one record.
#[derive(Debug, Clone, Copy)]
pub struct EntityView<'a> {
    handle: EntityHandle,
    kind: EntityKind,
    bytes: &'a [u8],
    user_end: usize,
}

impl<'a> EntityView<'a> {
    /// Wrap the bytes of a record whose size and kind were already checked.
    pub(super) fn new(handle: EntityHandle, kind: EntityKind, bytes: &'a [u8]) -> Option<Self> {
        let user_len = widen(read_u32(bytes, USER_LEN_OFFSET)?);
        let user_end = kind.header_size().checked_add(user_len)?;
        if padded_length(user_end) > bytes.len() {
            return None;
        }
        Some(Self {
            handle,
            kind,
            bytes,
            user_end,
        })
    }

    /// Record kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Handle this view was resolved from.
    #[must_use]
    pub const fn handle(&self) -> EntityHandle {
        self.handle
    }

    /// Entity identifier.
    #[must_use]
    pub fn id(&self) -> i64 {
        read_i64(self.bytes, ID_OFFSET).unwrap_or_default()
    }

    /// Object version.
    #[must_use]
    pub fn version(&self) -> u32 {
        read_u32(self.bytes, VERSION_OFFSET).unwrap_or_default()
    }

    /// Changeset identifier.
    #[must_use]
    pub fn changeset(&self) -> u32 {
        read_u32(self.bytes, CHANGESET_OFFSET).unwrap_or_default()
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        read_u32(self.bytes, TIMESTAMP_OFFSET).unwrap_or_default()
    }

    /// Editing user's identifier.
    #[must_use]
    pub fn uid(&self) -> u32 {
        read_u32(self.bytes, UID_OFFSET).unwrap_or_default()
    }

    /// Whether the object is visible.
    #[must_use]
    pub fn visible(&self) -> bool {
        read_u16(self.bytes, FLAGS_OFFSET).is_some_and(|flags| flags & FLAG_VISIBLE != 0)
    }

    /// Editing user's name.
    #[must_use]
    pub fn user(&self) -> &'a str {
        self.bytes
            .get(self.kind.header_size()..self.user_end)
            .and_then(|raw| std::str::from_utf8(raw).ok())
            .unwrap_or_default()
    }

    /// Node location; undefined for every other kind.
    #[must_use]
    pub fn location(&self) -> Location {
        if self.kind != EntityKind::Node {
            return Location::undefined();
        }
        match (
            read_i32(self.bytes, NODE_X_OFFSET),
            read_i32(self.bytes, NODE_Y_OFFSET),
        ) {
            (Some(x), Some(y)) => Location::new(x, y),
            _ => Location::undefined(),
        }
    }

    /// Cursor over the sub-items in write order.
    #[must_use]
    pub const fn sub_items(&self) -> SubItems<'a> {
        SubItems {
            bytes: self.bytes,
            offset: padded_length(self.user_end),
        }
    }

    /// First sub-item of `kind`, or an empty one when the record has none.
    #[must_use]
    pub fn sub_item(&self, kind: SubItemKind) -> SubItem<'a> {
        self.sub_items()
            .find(|item| item.kind == kind)
            .unwrap_or(SubItem { kind, payload: &[] })
    }

    /// Tags of the record.
    #[must_use]
    pub fn tags(&self) -> Tags<'a> {
        Tags {
            rest: self.sub_item(SubItemKind::TagList).payload,
        }
    }

    /// Value of the tag `key`.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&'a str> {
        self.tags().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Node references of a way.
    #[must_use]
    pub fn node_refs(&self) -> NodeRefs<'a> {
        NodeRefs::new(self.sub_item(SubItemKind::NodeRefList).payload)
    }

    /// Members of a relation.
    #[must_use]
    pub fn members(&self) -> Members<'a> {
        Members {
            payload: self.sub_item(SubItemKind::MemberList).payload,
            offset: 0,
        }
    }

    /// Rings of an area, outers first followed by their inners.
    #[must_use]
    pub const fn rings(&self) -> Rings<'a> {
        Rings {
            items: self.sub_items(),
        }
    }

    /// Bytes the record occupies, padding included.
    #[must_use]
    pub const fn total_padded_size(&self) -> usize {
        self.bytes.len()
    }
}

/// One typed sub-item payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubItem<'a> {
    kind: SubItemKind,
    payload: &'a [u8],
}

impl<'a> SubItem<'a> {
    /// Sub-item kind.
    #[must_use]
    pub const fn kind(&self) -> SubItemKind {
        self.kind
    }

    /// Payload without header or trailing padding.
    #[must_use]
    pub const fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Whether the payload is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Bounds-checked cursor over the sub-items of one record.
#[derive(Debug, Clone)]
pub struct SubItems<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> SubItems<'a> {
    fn decode(&self) -> Option<(SubItem<'a>, usize)> {
        let size = widen(read_u32(self.bytes, self.offset.checked_add(SIZE_OFFSET)?)?);
        let kind = SubItemKind::from_code(read_u16(
            self.bytes,
            self.offset.checked_add(KIND_OFFSET)?,
        )?)?;
        if size < ITEM_HEADER_SIZE {
            return None;
        }
        let end = self.offset.checked_add(size)?;
        let payload = self.bytes.get(self.offset + ITEM_HEADER_SIZE..end)?;
        Some((SubItem { kind, payload }, padded_length(size)))
    }
}

impl<'a> Iterator for SubItems<'a> {
    type Item = SubItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let decoded = self.decode();
        debug_assert!(decoded.is_some(), "sub-item overruns its record at {}", self.offset);
        let Some((item, advance)) = decoded else {
            self.offset = self.bytes.len();
            return None;
        };
        self.offset += advance;
        Some(item)
    }
}

impl FusedIterator for SubItems<'_> {}

/// Key/value pairs of a tag list.
#[derive(Debug, Clone)]
pub struct Tags<'a> {
    rest: &'a [u8],
}

impl<'a> Tags<'a> {
    fn take_text(&mut self) -> Option<&'a str> {
        let end = self.rest.iter().position(|byte| *byte == 0)?;
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest.get(1..).unwrap_or_default();
        std::str::from_utf8(text).ok()
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let pair = self.take_text().zip(self.take_text());
        debug_assert!(pair.is_some(), "malformed tag list");
        if pair.is_none() {
            self.rest = &[];
        }
        pair
    }
}

impl FusedIterator for Tags<'_> {}

/// Decoded node references of a way or ring.
#[derive(Debug, Clone)]
pub struct NodeRefs<'a> {
    entries: ChunksExact<'a, u8>,
}

impl<'a> NodeRefs<'a> {
    fn new(payload: &'a [u8]) -> Self {
        let entries = payload.chunks_exact(NODE_REF_ENTRY_SIZE);
        debug_assert!(entries.remainder().is_empty(), "truncated node reference");
        Self { entries }
    }
}

fn decode_node_ref(mut entry: &[u8]) -> NodeRef {
    let id = entry.get_i64_le();
    let x = entry.get_i32_le();
    let y = entry.get_i32_le();
    NodeRef::new(id, Location::new(x, y))
}

impl Iterator for NodeRefs<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(decode_node_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl DoubleEndedIterator for NodeRefs<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(decode_node_ref)
    }
}

impl ExactSizeIterator for NodeRefs<'_> {}

impl FusedIterator for NodeRefs<'_> {}

/// One relation member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member<'a> {
    /// Kind of the referenced entity.
    pub kind: EntityKind,
    /// Identifier of the referenced entity.
    pub id: i64,
    /// Role within the relation, possibly empty.
    pub role: &'a str,
}

/// Members of a relation.
#[derive(Debug, Clone)]
pub struct Members<'a> {
    payload: &'a [u8],
    offset: usize,
}

impl<'a> Members<'a> {
    fn decode(&self) -> Option<(Member<'a>, usize)> {
        let id = read_i64(self.payload, self.offset)?;
        let kind = EntityKind::from_code(read_u16(self.payload, self.offset.checked_add(8)?)?)?;
        let role_len = usize::from(read_u16(self.payload, self.offset.checked_add(10)?)?);
        let role_start = self.offset.checked_add(MEMBER_ENTRY_HEADER_SIZE)?;
        let raw = self.payload.get(role_start..role_start.checked_add(role_len)?)?;
        let role = std::str::from_utf8(raw).ok()?;
        Some((
            Member { kind, id, role },
            MEMBER_ENTRY_HEADER_SIZE + padded_length(role_len),
        ))
    }
}

impl<'a> Iterator for Members<'a> {
    type Item = Member<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.payload.len() {
            return None;
        }
        let decoded = self.decode();
        debug_assert!(decoded.is_some(), "malformed member at {}", self.offset);
        let Some((member, advance)) = decoded else {
            self.offset = self.payload.len();
            return None;
        };
        self.offset += advance;
        Some(member)
    }
}

impl FusedIterator for Members<'_> {}

/// Node references of one stored ring together with its role.
#[derive(Debug, Clone)]
pub struct RingRefs<'a> {
    role: RingRole,
    refs: NodeRefs<'a>,
}

impl<'a> RingRefs<'a> {
    /// Outer or inner.
    #[must_use]
    pub const fn role(&self) -> RingRole {
        self.role
    }

    /// Closed sequence of node references.
    #[must_use]
    pub fn refs(&self) -> NodeRefs<'a> {
        self.refs.clone()
    }
}

/// Rings stored in an area record.
#[derive(Debug, Clone)]
pub struct Rings<'a> {
    items: SubItems<'a>,
}

impl<'a> Iterator for Rings<'a> {
    type Item = RingRefs<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.find_map(|item| {
            let role = match item.kind {
                SubItemKind::OuterRing => RingRole::Outer,
                SubItemKind::InnerRing => RingRole::Inner,
                SubItemKind::TagList | SubItemKind::NodeRefList | SubItemKind::MemberList => {
                    return None;
                }
            };
            Some(RingRefs {
                role,
                refs: NodeRefs::new(item.payload),
            })
        })
    }
}

impl FusedIterator for Rings<'_> {}
