//! Core data model and polygon assembly for the areaforge engine.
//!
//! The crate is organised leaf-first:
//!
//! - [`Location`] and [`NodeRef`] carry fixed-precision coordinates.
//! - [`buffer`] packs node, way, relation and area records into an
//!   append-only arena addressed by offsets.
//! - [`IdIndex`] resolves node identifiers to locations.
//! - [`Segment`] and the [`area`] module turn way segments into wound,
//!   nested rings and write them back as area records.
//!
//! Decoders plug in through the [`BufferSource`] trait.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod area;
pub mod buffer;
pub mod index;
mod location;
mod node_ref;
mod segment;
mod source;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use area::{AreaAssembler, AssembledArea, AssemblyError, Ring, RingRole};
pub use buffer::{BufferError, EntityBuffer, EntityHandle, EntityKind, EntityView};
pub use index::{IdIndex, IndexError, SortSummary};
pub use location::{COORDINATE_PRECISION, Location, LocationError};
pub use node_ref::NodeRef;
pub use segment::{
    OrientedSegment, Segment, Winding, calculate_intersection, outside_x_range, y_range_overlap,
};
pub use source::{BufferSource, EntityFilter};
