//! Facade crate for the areaforge area assembly engine.
//!
//! This crate re-exports the core buffer, index and assembly types and
//! exposes the PBF-backed area builder behind the `pbf` feature.

#![forbid(unsafe_code)]

pub use areaforge_core::{
    AreaAssembler, AssembledArea, AssemblyError, BufferError, BufferSource, EntityBuffer,
    EntityFilter, EntityKind, EntityView, IdIndex, IndexError, Location, NodeRef, Ring, RingRole,
};

#[cfg(feature = "test-support")]
pub use areaforge_core::test_support;

#[cfg(feature = "pbf")]
pub use areaforge_data::{
    AreaBuildError, AreaBuildReport, AreaBuildSummary, AreaOptions, PbfSource, PbfSourceError,
    build_areas, build_areas_from_pbf,
};
