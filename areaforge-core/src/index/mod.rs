//! Identifier-to-value lookup backed by a sorted vector.
//!
//! Values are appended in arrival order and sorted once before lookups.
//! Input that arrives with strictly increasing identifiers, as nodes in an
//! ordered extract do, can be queried without sorting at all.

use std::mem::size_of;

use thiserror::Error;

/// Errors returned by [`IdIndex::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The identifier was never stored.
    #[error("identifier {0} not found")]
    NotFound(i64),
    /// The index was queried before [`IdIndex::sort`].
    #[error("index queried before sorting")]
    Unsorted,
}

/// Outcome of [`IdIndex::sort`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSummary {
    /// Entries left after sorting.
    pub entries: usize,
    /// Later entries removed because their identifier was already present.
    pub duplicates_removed: usize,
}

/// Maps identifiers to small `Copy` values.
///
/// When an identifier is stored more than once, sorting keeps the value
/// stored first and counts the rest as duplicates.
///
/// # Examples
///
/// ```
/// use areaforge_core::{IdIndex, IndexError, Location};
///
/// let mut index = IdIndex::new();
/// index.put(20, Location::new(2, 2));
/// index.put(10, Location::new(1, 1));
/// assert_eq!(index.get(10), Err(IndexError::Unsorted));
///
/// index.sort();
/// assert_eq!(index.get(10), Ok(Location::new(1, 1)));
/// assert_eq!(index.get(30), Err(IndexError::NotFound(30)));
/// ```
#[derive(Debug, Clone)]
pub struct IdIndex<V> {
    entries: Vec<(i64, V)>,
    sorted: bool,
    duplicates: usize,
}

impl<V> Default for IdIndex<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            sorted: true,
            duplicates: 0,
        }
    }
}

impl<V: Copy> IdIndex<V> {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append an entry.
    pub fn put(&mut self, id: i64, value: V) {
        if self.sorted {
            self.sorted = self.entries.last().is_none_or(|(last, _)| *last < id);
        }
        self.entries.push((id, value));
    }

    /// Sort by identifier and drop repeated identifiers.
    ///
    /// Sorting an already sorted index is a no-op.
    pub fn sort(&mut self) -> SortSummary {
        if !self.sorted {
            self.entries.sort_by_key(|(id, _)| *id);
            let before = self.entries.len();
            self.entries.dedup_by_key(|(id, _)| *id);
            self.duplicates += before - self.entries.len();
            self.sorted = true;
        }
        SortSummary {
            entries: self.entries.len(),
            duplicates_removed: self.duplicates,
        }
    }

    /// Look up the value stored for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NotFound`] for unknown identifiers and
    /// [`IndexError::Unsorted`] when entries arrived out of order and
    /// [`sort`](Self::sort) has not run since.
    pub fn get(&self, id: i64) -> Result<V, IndexError> {
        if !self.sorted {
            return Err(IndexError::Unsorted);
        }
        self.entries
            .binary_search_by_key(&id, |(key, _)| *key)
            .ok()
            .and_then(|position| self.entries.get(position))
            .map(|(_, value)| *value)
            .ok_or(IndexError::NotFound(id))
    }

    /// Whether lookups are possible without sorting.
    #[must_use]
    pub const fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Number of stored entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Repeated identifiers dropped by sorting so far.
    #[must_use]
    pub const fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Bytes allocated for entries.
    #[must_use]
    pub const fn used_memory(&self) -> usize {
        self.entries.capacity() * size_of::<(i64, V)>()
    }

    /// Remove every entry and release the allocation.
    pub fn clear(&mut self) {
        self.entries = Vec::new();
        self.sorted = true;
        self.duplicates = 0;
    }
}

impl<V: Copy> Extend<(i64, V)> for IdIndex<V> {
    fn extend<T: IntoIterator<Item = (i64, V)>>(&mut self, iter: T) {
        for (id, value) in iter {
            self.put(id, value);
        }
    }
}

impl<V: Copy> FromIterator<(i64, V)> for IdIndex<V> {
    fn from_iter<T: IntoIterator<Item = (i64, V)>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}
