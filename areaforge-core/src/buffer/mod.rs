//! Append-only arena of packed, variable-length entity records.
//!
//! Records are addressed by [`EntityHandle`]s, which are byte offsets into
//! the arena rather than pointers, so they stay valid while the arena grows.
//! Each record describes its own length and the lengths of its sub-items;
//! readers walk them with bounds-checked cursors.
//!
//! Records are written through an [`EntityBuilder`]. A record only becomes
//! visible once [`EntityBuilder::commit`] succeeds; a builder dropped early
//! (including through `?` on an error) truncates the arena back to where it
//! started.

use bytes::BytesMut;
use thiserror::Error;

mod builder;
mod layout;
mod view;

pub use builder::{EntityBuilder, EntityHeader};
pub use layout::{ALIGNMENT, EntityKind, SubItemKind, padded_length};
pub use view::{
    EntityView, Member, Members, NodeRefs, RingRefs, Rings, SubItem, SubItems, Tags,
};

use layout::{KIND_OFFSET, SIZE_OFFSET, read_u16, read_u32, widen};

/// Offset of a committed record inside an [`EntityBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle(usize);

impl EntityHandle {
    /// Byte offset of the record.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.0
    }
}

/// Errors raised while writing or addressing records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Growing the arena would exceed its configured limit.
    #[error("buffer capacity exceeded: {requested} bytes requested, limit is {limit}")]
    CapacityExceeded {
        /// Total size the arena would have reached.
        requested: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// A length did not fit the 32-bit field storing it.
    #[error("{field} of {len} bytes does not fit the record layout")]
    FieldTooLarge {
        /// Name of the oversized field.
        field: &'static str,
        /// Offending length.
        len: usize,
    },
    /// A tag key or value contained a NUL byte.
    #[error("tag text {text:?} contains a NUL byte")]
    EmbeddedNul {
        /// The rejected text.
        text: String,
    },
    /// The handle does not point at a committed record.
    #[error("no record starts at offset {offset}")]
    InvalidHandle {
        /// Offset carried by the handle.
        offset: usize,
    },
}

/// Growable arena holding committed entity records back to back.
///
/// # Examples
///
/// ```
/// use areaforge_core::buffer::{EntityBuffer, EntityHeader, EntityKind};
///
/// # fn main() -> Result<(), areaforge_core::buffer::BufferError> {
/// let mut buffer = EntityBuffer::new();
/// let mut way = buffer.builder(&EntityHeader::new(EntityKind::Way, 42).with_user("mapper"))?;
/// way.add_tags([("highway", "residential")])?;
/// let handle = way.commit()?;
///
/// let view = buffer.get(handle)?;
/// assert_eq!(view.id(), 42);
/// assert_eq!(view.user(), "mapper");
/// assert_eq!(view.tag("highway"), Some("residential"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityBuffer {
    data: BytesMut,
    records: usize,
    limit: Option<usize>,
}

impl EntityBuffer {
    /// Create an unbounded buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer that refuses to grow beyond `limit` bytes.
    #[must_use]
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            data: BytesMut::new(),
            records: 0,
            limit: Some(limit),
        }
    }

    /// Start writing a record described by `header`.
    ///
    /// # Errors
    ///
    /// Fails when the header does not fit the layout or the capacity limit.
    pub fn builder(&mut self, header: &EntityHeader<'_>) -> Result<EntityBuilder<'_>, BufferError> {
        EntityBuilder::start(self, header)
    }

    /// Resolve a handle to a view over its record.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidHandle`] when no committed record starts
    /// at the handle's offset.
    pub fn get(&self, handle: EntityHandle) -> Result<EntityView<'_>, BufferError> {
        self.record_at(handle.0)
            .ok_or(BufferError::InvalidHandle { offset: handle.0 })
    }

    /// Iterate over every committed record in insertion order.
    #[must_use]
    pub fn iter(&self) -> Entities<'_> {
        Entities {
            buffer: self,
            offset: 0,
        }
    }

    /// Number of committed records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records
    }

    /// Whether the buffer holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Bytes occupied by committed records.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Raw in-memory layout of the committed records.
    ///
    /// This is a process-local representation, not a persistence format.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Drop every record, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        self.data.clear();
        self.records = 0;
    }

    /// Append all records of `other` after the records of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::CapacityExceeded`] when the combined size
    /// exceeds this buffer's limit; `self` is left unchanged.
    pub fn extend_from(&mut self, other: &Self) -> Result<(), BufferError> {
        self.ensure(other.data.len())?;
        self.data.extend_from_slice(&other.data);
        self.records += other.records;
        Ok(())
    }

    pub(crate) fn ensure(&mut self, additional: usize) -> Result<(), BufferError> {
        let requested = self.data.len().saturating_add(additional);
        if let Some(limit) = self.limit {
            if requested > limit {
                return Err(BufferError::CapacityExceeded { requested, limit });
            }
        }
        self.data.reserve(additional);
        Ok(())
    }

    pub(crate) const fn data_mut(&mut self) -> &mut BytesMut {
        &mut self.data
    }

    pub(crate) const fn record_committed(&mut self) {
        self.records += 1;
    }

    fn record_at(&self, offset: usize) -> Option<EntityView<'_>> {
        let size = widen(read_u32(&self.data, offset.checked_add(SIZE_OFFSET)?)?);
        let kind = EntityKind::from_code(read_u16(&self.data, offset.checked_add(KIND_OFFSET)?)?)?;
        if size < kind.header_size() || padded_length(size) != size {
            return None;
        }
        let bytes = self.data.get(offset..offset.checked_add(size)?)?;
        EntityView::new(EntityHandle(offset), kind, bytes)
    }
}

impl<'a> IntoIterator for &'a EntityBuffer {
    type Item = EntityView<'a>;
    type IntoIter = Entities<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the records of an [`EntityBuffer`].
#[derive(Debug, Clone)]
pub struct Entities<'a> {
    buffer: &'a EntityBuffer,
    offset: usize,
}

impl<'a> Iterator for Entities<'a> {
    type Item = EntityView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.buffer.data.len() {
            return None;
        }
        let view = self.buffer.record_at(self.offset);
        debug_assert!(view.is_some(), "corrupt record at offset {}", self.offset);
        let Some(view) = view else {
            self.offset = self.buffer.data.len();
            return None;
        };
        self.offset += view.total_padded_size();
        Some(view)
    }
}
