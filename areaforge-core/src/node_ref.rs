//! Node references: an identifier paired with its resolved location.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::Location;

/// Identifier of a node plus the location it resolved to.
///
/// Equality, ordering and hashing look at the location only. Adjacent ways
/// that reference the same coordinate through different node identifiers
/// must still share a vertex during assembly.
///
/// # Examples
///
/// ```
/// use areaforge_core::{Location, NodeRef};
///
/// let a = NodeRef::new(1, Location::new(10, 20));
/// let b = NodeRef::new(2, Location::new(10, 20));
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRef {
    id: i64,
    location: Location,
}

impl NodeRef {
    /// Pair a node identifier with a location.
    #[must_use]
    pub const fn new(id: i64, location: Location) -> Self {
        Self { id, location }
    }

    /// A reference created at a computed point rather than an input node.
    #[must_use]
    pub const fn synthetic(location: Location) -> Self {
        Self { id: 0, location }
    }

    /// Node identifier, `0` for synthetic points.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Resolved location.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for NodeRef {}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location.cmp(&other.location)
    }
}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>{}", self.id, self.location)
    }
}
