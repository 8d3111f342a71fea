//! Input decoding and area building for the areaforge engine.
//!
//! Responsibilities:
//! - Decode OSM PBF files into entity buffers ([`PbfSource`]).
//! - Select area candidates, resolve their node locations and assemble them
//!   ([`build_areas`], [`build_areas_from_pbf`]).
//!
//! Boundaries:
//! - Geometry rules live in `areaforge-core`; this crate only feeds them.
//! - Malformed areas are skipped, counted and logged; only unreadable input
//!   or unwritable output aborts a build.
//!
//! Invariants:
//! - Output is ordered by area identifier whatever the worker count.
//! - No global mutable state.
#![forbid(unsafe_code)]

mod areas;
mod pbf;

pub use areas::{
    AreaBuildError, AreaBuildReport, AreaBuildSummary, AreaOptions, Pass, build_areas,
    build_areas_from_pbf,
};
pub use pbf::{PbfSource, PbfSourceError};
