//! Transactional record writer.

use bytes::BufMut;

use super::layout::{
    CHANGESET_OFFSET, EntityKind, FLAG_VISIBLE, FLAGS_OFFSET, ID_OFFSET, KIND_OFFSET,
    MEMBER_ENTRY_HEADER_SIZE, NODE_REF_ENTRY_SIZE, NODE_X_OFFSET, NODE_Y_OFFSET, SIZE_OFFSET,
    SubItemKind, TIMESTAMP_OFFSET, UID_OFFSET, USER_LEN_OFFSET, VERSION_OFFSET, padded_length,
};
use super::view::Member;
use super::{BufferError, EntityBuffer, EntityHandle};
use crate::area::RingRole;
use crate::{Location, NodeRef};

const SUB_ITEM_HEADER_SIZE: usize = 8;

/// Scalar attributes written into a record's fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityHeader<'a> {
    /// Record kind.
    pub kind: EntityKind,
    /// Entity identifier.
    pub id: i64,
    /// Object version.
    pub version: u32,
    /// Changeset that produced this version.
    pub changeset: u32,
    /// Seconds since the Unix epoch.
    pub timestamp: u32,
    /// Editing user's identifier, `0` for anonymous.
    pub uid: u32,
    /// Whether the object is visible (not deleted).
    pub visible: bool,
    /// Editing user's name.
    pub user: &'a str,
    /// Location, stored for nodes only.
    pub location: Location,
}

impl<'a> EntityHeader<'a> {
    /// Header with zeroed metadata, visible and without a location.
    #[must_use]
    pub const fn new(kind: EntityKind, id: i64) -> Self {
        Self {
            kind,
            id,
            version: 0,
            changeset: 0,
            timestamp: 0,
            uid: 0,
            visible: true,
            user: "",
            location: Location::undefined(),
        }
    }

    /// Set the user name.
    #[must_use]
    pub const fn with_user(mut self, user: &'a str) -> Self {
        self.user = user;
        self
    }

    /// Set the node location.
    #[must_use]
    pub const fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// Writes one record; see [`EntityBuffer::builder`].
///
/// The record is rolled back unless [`commit`](Self::commit) succeeds.
#[derive(Debug)]
pub struct EntityBuilder<'b> {
    buffer: &'b mut EntityBuffer,
    start: usize,
    committed: bool,
}

impl<'b> EntityBuilder<'b> {
    pub(super) fn start(
        buffer: &'b mut EntityBuffer,
        header: &EntityHeader<'_>,
    ) -> Result<Self, BufferError> {
        let user_len = u32::try_from(header.user.len()).map_err(|_| BufferError::FieldTooLarge {
            field: "user name",
            len: header.user.len(),
        })?;
        let start = buffer.byte_len();
        let mut builder = Self {
            buffer,
            start,
            committed: false,
        };
        let fixed = header.kind.header_size();
        builder.buffer.ensure(fixed + padded_length(header.user.len()))?;

        let flags = if header.visible { FLAG_VISIBLE } else { 0 };
        builder.buffer.data_mut().put_bytes(0, fixed);
        builder.patch_u16(KIND_OFFSET, header.kind.code());
        builder.patch_u16(FLAGS_OFFSET, flags);
        builder.patch_i64(ID_OFFSET, header.id);
        builder.patch_u32(VERSION_OFFSET, header.version);
        builder.patch_u32(CHANGESET_OFFSET, header.changeset);
        builder.patch_u32(TIMESTAMP_OFFSET, header.timestamp);
        builder.patch_u32(UID_OFFSET, header.uid);
        builder.patch_u32(USER_LEN_OFFSET, user_len);
        if header.kind == EntityKind::Node {
            builder.patch_i32(NODE_X_OFFSET, header.location.x());
            builder.patch_i32(NODE_Y_OFFSET, header.location.y());
        }
        builder.buffer.data_mut().put_slice(header.user.as_bytes());
        builder.pad();
        Ok(builder)
    }

    /// Append a tag list sub-item.
    ///
    /// # Errors
    ///
    /// Rejects keys or values containing NUL and growth past the limit.
    pub fn add_tags<'t, I>(&mut self, tags: I) -> Result<&mut Self, BufferError>
    where
        I: IntoIterator<Item = (&'t str, &'t str)>,
    {
        let sub_item = self.open_sub_item(SubItemKind::TagList)?;
        for (key, value) in tags {
            for text in [key, value] {
                if text.as_bytes().contains(&0) {
                    return Err(BufferError::EmbeddedNul {
                        text: text.to_owned(),
                    });
                }
                self.buffer.ensure(text.len() + 1)?;
                let data = self.buffer.data_mut();
                data.put_slice(text.as_bytes());
                data.put_u8(0);
            }
        }
        self.close_sub_item(sub_item)?;
        Ok(self)
    }

    /// Append the node references of a way.
    ///
    /// # Errors
    ///
    /// Fails on growth past the limit.
    pub fn add_node_refs(&mut self, refs: &[NodeRef]) -> Result<&mut Self, BufferError> {
        self.add_ref_list(SubItemKind::NodeRefList, refs)
    }

    /// Append one assembled ring.
    ///
    /// # Errors
    ///
    /// Fails on growth past the limit.
    pub fn add_ring(&mut self, role: RingRole, refs: &[NodeRef]) -> Result<&mut Self, BufferError> {
        let kind = match role {
            RingRole::Outer => SubItemKind::OuterRing,
            RingRole::Inner => SubItemKind::InnerRing,
        };
        self.add_ref_list(kind, refs)
    }

    /// Append relation members.
    ///
    /// # Errors
    ///
    /// Fails when a role is longer than `u16::MAX` bytes or on growth past
    /// the limit.
    pub fn add_members<'m, I>(&mut self, members: I) -> Result<&mut Self, BufferError>
    where
        I: IntoIterator<Item = Member<'m>>,
    {
        let sub_item = self.open_sub_item(SubItemKind::MemberList)?;
        for member in members {
            let role = member.role.as_bytes();
            let role_len = u16::try_from(role.len()).map_err(|_| BufferError::FieldTooLarge {
                field: "member role",
                len: role.len(),
            })?;
            self.buffer
                .ensure(MEMBER_ENTRY_HEADER_SIZE + padded_length(role.len()))?;
            let data = self.buffer.data_mut();
            data.put_i64_le(member.id);
            data.put_u16_le(member.kind.code());
            data.put_u16_le(role_len);
            data.put_u32_le(0);
            data.put_slice(role);
            self.pad();
        }
        self.close_sub_item(sub_item)?;
        Ok(self)
    }

    /// Finish the record and make it visible to readers.
    ///
    /// # Errors
    ///
    /// Fails when the record exceeds the 32-bit size field; the record is
    /// rolled back.
    pub fn commit(mut self) -> Result<EntityHandle, BufferError> {
        let len = self.buffer.byte_len() - self.start;
        let size = u32::try_from(len).map_err(|_| BufferError::FieldTooLarge {
            field: "record",
            len,
        })?;
        self.patch_u32(SIZE_OFFSET, size);
        self.committed = true;
        self.buffer.record_committed();
        Ok(EntityHandle(self.start))
    }

    fn add_ref_list(&mut self, kind: SubItemKind, refs: &[NodeRef]) -> Result<&mut Self, BufferError> {
        let sub_item = self.open_sub_item(kind)?;
        self.buffer.ensure(refs.len().saturating_mul(NODE_REF_ENTRY_SIZE))?;
        let data = self.buffer.data_mut();
        for node in refs {
            data.put_i64_le(node.id());
            data.put_i32_le(node.location().x());
            data.put_i32_le(node.location().y());
        }
        self.close_sub_item(sub_item)?;
        Ok(self)
    }

    /// Write a sub-item header and return its absolute offset.
    fn open_sub_item(&mut self, kind: SubItemKind) -> Result<usize, BufferError> {
        self.buffer.ensure(SUB_ITEM_HEADER_SIZE)?;
        let offset = self.buffer.byte_len();
        let data = self.buffer.data_mut();
        data.put_u32_le(0);
        data.put_u16_le(kind.code());
        data.put_u16_le(0);
        Ok(offset)
    }

    fn close_sub_item(&mut self, offset: usize) -> Result<(), BufferError> {
        let len = self.buffer.byte_len() - offset;
        let size = u32::try_from(len).map_err(|_| BufferError::FieldTooLarge {
            field: "sub-item",
            len,
        })?;
        self.patch_absolute(offset, |mut slot| slot.put_u32_le(size));
        self.buffer.ensure(padded_length(len) - len)?;
        self.pad();
        Ok(())
    }

    fn pad(&mut self) {
        let data = self.buffer.data_mut();
        let len = data.len();
        data.put_bytes(0, padded_length(len) - len);
        debug_assert_eq!(padded_length(data.len()), data.len());
    }

    fn patch_u16(&mut self, offset: usize, value: u16) {
        self.patch_absolute(self.start + offset, |mut slot| slot.put_u16_le(value));
    }

    fn patch_u32(&mut self, offset: usize, value: u32) {
        self.patch_absolute(self.start + offset, |mut slot| slot.put_u32_le(value));
    }

    fn patch_i32(&mut self, offset: usize, value: i32) {
        self.patch_absolute(self.start + offset, |mut slot| slot.put_i32_le(value));
    }

    fn patch_i64(&mut self, offset: usize, value: i64) {
        self.patch_absolute(self.start + offset, |mut slot| slot.put_i64_le(value));
    }

    fn patch_absolute(&mut self, offset: usize, write: impl FnOnce(&mut [u8])) {
        let tail = self.buffer.data_mut().get_mut(offset..);
        debug_assert!(tail.is_some(), "patch offset {offset} past end of buffer");
        if let Some(slot) = tail {
            write(slot);
        }
    }
}

impl Drop for EntityBuilder<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.buffer.data_mut().truncate(self.start);
        }
    }
}
