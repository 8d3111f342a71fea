//! The seam between decoders and the assembly pipeline.

use crate::buffer::{EntityBuffer, EntityKind};

/// Produces entity buffers one block at a time.
///
/// Implementations block until the next buffer is ready. An empty buffer
/// signals the end of input; callers stop reading at the first one.
pub trait BufferSource {
    /// Error raised while decoding.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the next block of entities.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error when the input is unreadable.
    fn read(&mut self) -> Result<EntityBuffer, Self::Error>;
}

impl<S: BufferSource + ?Sized> BufferSource for &mut S {
    type Error = S::Error;

    fn read(&mut self) -> Result<EntityBuffer, Self::Error> {
        (**self).read()
    }
}

/// Which entity kinds a source should decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityFilter {
    /// Decode nodes.
    pub nodes: bool,
    /// Decode ways.
    pub ways: bool,
    /// Decode relations.
    pub relations: bool,
}

impl EntityFilter {
    /// Every entity kind.
    pub const ALL: Self = Self {
        nodes: true,
        ways: true,
        relations: true,
    };

    /// Relations only, for a first pass collecting multipolygon members.
    pub const RELATIONS: Self = Self {
        nodes: false,
        ways: false,
        relations: true,
    };

    /// Nodes and ways, for a second pass resolving geometry.
    pub const NODES_AND_WAYS: Self = Self {
        nodes: true,
        ways: true,
        relations: false,
    };

    /// Whether entities of `kind` pass the filter. Areas never do.
    #[must_use]
    pub const fn accepts(self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Node => self.nodes,
            EntityKind::Way => self.ways,
            EntityKind::Relation => self.relations,
            EntityKind::Area => false,
        }
    }
}

impl Default for EntityFilter {
    fn default() -> Self {
        Self::ALL
    }
}
