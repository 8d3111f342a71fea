//! Two-pass area building over any [`BufferSource`].
//!
//! 1. The relation pass registers multipolygon and boundary relations and
//!    the ways they reference.
//! 2. The geometry pass indexes every node location, keeps the node lists
//!    of needed ways and registers closed area ways.
//!
//! Candidates are then assembled on scoped worker threads. Each worker
//! writes its own buffer; the buffers are concatenated in area-identifier
//! order so the output does not depend on the worker count.

use std::fmt;
use std::num::NonZeroUsize;

use areaforge_core::{
    BufferError, BufferSource, EntityBuffer, EntityFilter, EntityKind, EntityView, IdIndex,
    Location,
};
use camino::Utf8Path;
use geo::{Coord, Rect};
use log::{info, warn};
use thiserror::Error;

use crate::pbf::PbfSource;

mod build;
mod candidates;
mod ids;
mod tags;

use build::Resolver;
use candidates::AreaCandidates;

/// Tuning knobs for [`build_areas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaOptions {
    /// Worker threads used for assembly; `0` is treated as `1`.
    pub workers: usize,
    /// Per-area segment ceiling; larger areas are counted as malformed.
    pub max_segments: Option<usize>,
}

impl Default for AreaOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            max_segments: None,
        }
    }
}

/// Counts and extent gathered while building areas.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaBuildSummary {
    /// Nodes read in the geometry pass.
    pub nodes: u64,
    /// Ways read in the geometry pass.
    pub ways: u64,
    /// Relations read in the relation pass.
    pub relations: u64,
    /// Ways and relations selected for assembly.
    pub candidates: u64,
    /// Areas written to the output.
    pub built: u64,
    /// Candidates skipped because a way or node was missing.
    pub lookup_misses: u64,
    /// Candidates whose rings could not be assembled.
    pub malformed: u64,
    /// Repeated node identifiers dropped from the location index.
    pub duplicate_ids: u64,
    /// Bounding box of all node locations, in degrees
    /// (`x = longitude`, `y = latitude`).
    pub bounds: Option<Rect<f64>>,
}

impl AreaBuildSummary {
    fn record_node(&mut self, location: Location) {
        self.nodes += 1;
        if !location.is_defined() {
            return;
        }
        let coord = Coord {
            x: location.lon(),
            y: location.lat(),
        };
        self.bounds = Some(match self.bounds {
            Some(bounds) => Rect::new(
                Coord {
                    x: bounds.min().x.min(coord.x),
                    y: bounds.min().y.min(coord.y),
                },
                Coord {
                    x: bounds.max().x.max(coord.x),
                    y: bounds.max().y.max(coord.y),
                },
            ),
            None => Rect::new(coord, coord),
        });
    }
}

/// Areas built from one input, with the run summary.
#[derive(Debug)]
pub struct AreaBuildReport {
    /// One area record per successfully assembled candidate, ordered by
    /// area identifier.
    pub areas: EntityBuffer,
    /// Counts and extent of the run.
    pub summary: AreaBuildSummary,
}

/// Which read pass failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// The first pass, reading relations.
    Relations,
    /// The second pass, reading nodes and ways.
    Geometry,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Relations => "relation",
            Self::Geometry => "geometry",
        })
    }
}

/// Errors that abort an area build.
#[derive(Debug, Error)]
pub enum AreaBuildError {
    /// The input could not be opened or decoded.
    #[error("failed to read the {pass} pass")]
    Source {
        /// Pass that failed.
        pass: Pass,
        /// Decoder failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Assembled areas could not be written.
    #[error("failed to write assembled areas")]
    Buffer(#[from] BufferError),
}

impl AreaBuildError {
    fn read_failure<E>(pass: Pass, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Source {
            pass,
            source: Box::new(err),
        }
    }
}

/// Build areas from two readings of the same input.
///
/// `relations` must yield the input's relations and `geometry` its nodes and
/// ways; each may yield more kinds, which are ignored.
///
/// # Errors
///
/// Returns [`AreaBuildError::Source`] when either source fails and
/// [`AreaBuildError::Buffer`] when the output cannot be written. Areas that
/// cannot be assembled are skipped and counted, not reported as errors.
///
/// # Examples
/// ```
/// use areaforge_core::test_support::{MapFixture, VecSource};
/// use areaforge_data::{AreaOptions, build_areas};
///
/// # fn main() -> Result<(), areaforge_data::AreaBuildError> {
/// let extract = MapFixture::new()
///     .node(1, 0, 0)
///     .node(2, 10, 0)
///     .node(3, 10, 10)
///     .node(4, 0, 10)
///     .way(5, &[1, 2, 3, 4, 1], &[("building", "yes")])
///     .build();
/// let report = build_areas(
///     VecSource::new([extract.clone()]),
///     VecSource::new([extract]),
///     &AreaOptions::default(),
/// )?;
/// assert_eq!(report.summary.built, 1);
/// assert_eq!(report.areas.len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn build_areas<R, G>(
    mut relations: R,
    mut geometry: G,
    options: &AreaOptions,
) -> Result<AreaBuildReport, AreaBuildError>
where
    R: BufferSource,
    G: BufferSource,
{
    let mut summary = AreaBuildSummary::default();
    let mut candidates = AreaCandidates::default();

    drain(&mut relations, Pass::Relations, |view| {
        if view.kind() == EntityKind::Relation {
            summary.relations += 1;
            candidates.collect_relation(view);
        }
    })?;
    info!(
        "Relation pass read {} relations, {} area relations selected",
        summary.relations,
        candidates.len()
    );

    let mut index = IdIndex::new();
    drain(&mut geometry, Pass::Geometry, |view| match view.kind() {
        EntityKind::Node => {
            let location = view.location();
            summary.record_node(location);
            if location.is_defined() {
                index.put(view.id(), location);
            }
        }
        EntityKind::Way => {
            summary.ways += 1;
            candidates.collect_way(view);
        }
        EntityKind::Relation | EntityKind::Area => {}
    })?;
    let sorted = index.sort();
    summary.duplicate_ids = widen(sorted.duplicates_removed);
    if sorted.duplicates_removed > 0 {
        warn!(
            "Dropped {} repeated node identifiers; the first location of each was kept",
            sorted.duplicates_removed
        );
    }
    summary.candidates = widen(candidates.len());
    info!(
        "Geometry pass read {} nodes and {} ways, {} candidates in total",
        summary.nodes, summary.ways, summary.candidates
    );

    let jobs = candidates.take_jobs();
    let resolver = Resolver {
        index: &index,
        candidates: &candidates,
        max_segments: options.max_segments,
    };
    let (areas, counts) = resolver.run(&jobs, options.workers)?;
    summary.built = counts.built;
    summary.lookup_misses = counts.lookup_misses;
    summary.malformed = counts.malformed;
    info!(
        "Built {} areas ({} skipped for missing data, {} malformed)",
        summary.built, summary.lookup_misses, summary.malformed
    );

    Ok(AreaBuildReport { areas, summary })
}

/// Build areas from an OSM PBF file, reading it once per pass.
///
/// # Errors
///
/// As for [`build_areas`]; opening failures are reported against the pass
/// that attempted them.
///
/// # Examples
/// ```no_run
/// use areaforge_data::{AreaOptions, build_areas_from_pbf};
/// use camino::Utf8Path;
///
/// # fn main() -> Result<(), areaforge_data::AreaBuildError> {
/// let report = build_areas_from_pbf(Utf8Path::new("city.osm.pbf"), &AreaOptions::default())?;
/// println!("Built {} areas", report.summary.built);
/// # Ok(())
/// # }
/// ```
pub fn build_areas_from_pbf(
    path: &Utf8Path,
    options: &AreaOptions,
) -> Result<AreaBuildReport, AreaBuildError> {
    let relations = PbfSource::open(path, EntityFilter::RELATIONS)
        .map_err(|err| AreaBuildError::read_failure(Pass::Relations, err))?;
    let geometry = PbfSource::open(path, EntityFilter::NODES_AND_WAYS)
        .map_err(|err| AreaBuildError::read_failure(Pass::Geometry, err))?;
    build_areas(relations, geometry, options)
}

/// Feed every entity of `source` to `visit` until the end of input.
fn drain<S, F>(source: &mut S, pass: Pass, mut visit: F) -> Result<(), AreaBuildError>
where
    S: BufferSource,
    F: FnMut(&EntityView<'_>),
{
    loop {
        let buffer = source
            .read()
            .map_err(|err| AreaBuildError::read_failure(pass, err))?;
        if buffer.is_empty() {
            return Ok(());
        }
        for view in buffer.iter() {
            visit(&view);
        }
    }
}

fn widen(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests;
