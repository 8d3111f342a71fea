//! Record layout constants and little-endian field access.
//!
//! Every record starts with an 8-byte item header (`size: u32`, `kind: u16`,
//! `flags: u16`). Entity records continue with the fixed entity fields, the
//! user name and a run of sub-items, each padded to [`ALIGNMENT`].

use bytes::Buf;

/// Alignment of every record and sub-item.
pub const ALIGNMENT: usize = 8;

/// Round `len` up to the next multiple of [`ALIGNMENT`].
///
/// # Examples
///
/// ```
/// use areaforge_core::buffer::padded_length;
///
/// assert_eq!(padded_length(0), 0);
/// assert_eq!(padded_length(13), 16);
/// assert_eq!(padded_length(16), 16);
/// ```
#[must_use]
pub const fn padded_length(len: usize) -> usize {
    (len + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

pub(crate) const ITEM_HEADER_SIZE: usize = 8;
pub(crate) const SIZE_OFFSET: usize = 0;
pub(crate) const KIND_OFFSET: usize = 4;
pub(crate) const FLAGS_OFFSET: usize = 6;

pub(crate) const ID_OFFSET: usize = 8;
pub(crate) const VERSION_OFFSET: usize = 16;
pub(crate) const CHANGESET_OFFSET: usize = 20;
pub(crate) const TIMESTAMP_OFFSET: usize = 24;
pub(crate) const UID_OFFSET: usize = 28;
pub(crate) const USER_LEN_OFFSET: usize = 32;
pub(crate) const ENTITY_HEADER_SIZE: usize = 40;

pub(crate) const NODE_X_OFFSET: usize = 40;
pub(crate) const NODE_Y_OFFSET: usize = 44;
pub(crate) const NODE_HEADER_SIZE: usize = 48;

pub(crate) const NODE_REF_ENTRY_SIZE: usize = 16;
pub(crate) const MEMBER_ENTRY_HEADER_SIZE: usize = 16;

pub(crate) const FLAG_VISIBLE: u16 = 1;

/// Top-level record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    /// A point with a location.
    Node,
    /// An ordered list of node references.
    Way,
    /// A list of typed members with roles.
    Relation,
    /// Assembled polygon rings.
    Area,
}

impl EntityKind {
    pub(crate) const fn code(self) -> u16 {
        match self {
            Self::Node => 1,
            Self::Way => 2,
            Self::Relation => 3,
            Self::Area => 4,
        }
    }

    pub(crate) const fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Node),
            2 => Some(Self::Way),
            3 => Some(Self::Relation),
            4 => Some(Self::Area),
            _ => None,
        }
    }

    pub(crate) const fn header_size(self) -> usize {
        match self {
            Self::Node => NODE_HEADER_SIZE,
            Self::Way | Self::Relation | Self::Area => ENTITY_HEADER_SIZE,
        }
    }
}

/// Kinds of sub-items that may follow an entity header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubItemKind {
    /// NUL-separated key/value pairs.
    TagList,
    /// Way node references.
    NodeRefList,
    /// Relation members.
    MemberList,
    /// Node references of an outer ring.
    OuterRing,
    /// Node references of an inner ring.
    InnerRing,
}

impl SubItemKind {
    pub(crate) const fn code(self) -> u16 {
        match self {
            Self::TagList => 0x11,
            Self::NodeRefList => 0x12,
            Self::MemberList => 0x13,
            Self::OuterRing => 0x14,
            Self::InnerRing => 0x15,
        }
    }

    pub(crate) const fn from_code(code: u16) -> Option<Self> {
        match code {
            0x11 => Some(Self::TagList),
            0x12 => Some(Self::NodeRefList),
            0x13 => Some(Self::MemberList),
            0x14 => Some(Self::OuterRing),
            0x15 => Some(Self::InnerRing),
            _ => None,
        }
    }
}

fn field(bytes: &[u8], offset: usize, width: usize) -> Option<&[u8]> {
    bytes.get(offset..offset.checked_add(width)?)
}

pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    field(bytes, offset, 2).map(|mut slice| slice.get_u16_le())
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    field(bytes, offset, 4).map(|mut slice| slice.get_u32_le())
}

pub(crate) fn read_i32(bytes: &[u8], offset: usize) -> Option<i32> {
    field(bytes, offset, 4).map(|mut slice| slice.get_i32_le())
}

pub(crate) fn read_i64(bytes: &[u8], offset: usize) -> Option<i64> {
    field(bytes, offset, 8).map(|mut slice| slice.get_i64_le())
}

/// Widen a stored `u32` length. Lengths were narrowed from `usize` on write.
pub(crate) fn widen(len: u32) -> usize {
    usize::try_from(len).unwrap_or(usize::MAX)
}
