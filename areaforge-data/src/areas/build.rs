//! Assembly of candidate areas across scoped worker threads.

use std::thread;

use areaforge_core::buffer::EntityHeader;
use areaforge_core::{
    AreaAssembler, BufferError, EntityBuffer, EntityKind, IdIndex, Location,
    NodeRef,
};
use log::{debug, warn};

use super::candidates::{AreaCandidates, AreaJob};

/// Per-worker counts merged into the build summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct AssemblyCounts {
    pub(super) built: u64,
    pub(super) lookup_misses: u64,
    pub(super) malformed: u64,
}

impl AssemblyCounts {
    const fn merge(mut self, other: Self) -> Self {
        self.built += other.built;
        self.lookup_misses += other.lookup_misses;
        self.malformed += other.malformed;
        self
    }
}

/// Read-only inputs shared by every worker.
pub(super) struct Resolver<'a> {
    pub(super) index: &'a IdIndex<Location>,
    pub(super) candidates: &'a AreaCandidates,
    pub(super) max_segments: Option<usize>,
}

enum Outcome {
    Built,
    LookupMiss,
    Malformed,
}

impl Resolver<'_> {
    /// Assemble `jobs` on up to `workers` threads and concatenate their
    /// output in job order.
    pub(super) fn run(
        &self,
        jobs: &[AreaJob],
        workers: usize,
    ) -> Result<(EntityBuffer, AssemblyCounts), BufferError> {
        let chunk_size = jobs.len().div_ceil(workers.max(1)).max(1);
        let results: Vec<Result<(EntityBuffer, AssemblyCounts), BufferError>> =
            thread::scope(|scope| {
                let handles: Vec<_> = jobs
                    .chunks(chunk_size)
                    .map(|chunk| scope.spawn(move || self.assemble_chunk(chunk)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                    })
                    .collect()
            });

        let mut areas = EntityBuffer::new();
        let mut counts = AssemblyCounts::default();
        for result in results {
            let (chunk_areas, chunk_counts) = result?;
            areas.extend_from(&chunk_areas)?;
            counts = counts.merge(chunk_counts);
        }
        Ok((areas, counts))
    }

    fn assemble_chunk(&self, jobs: &[AreaJob]) -> Result<(EntityBuffer, AssemblyCounts), BufferError> {
        let mut buffer = EntityBuffer::new();
        let mut counts = AssemblyCounts::default();
        for job in jobs {
            match self.assemble_job(job, &mut buffer)? {
                Outcome::Built => counts.built += 1,
                Outcome::LookupMiss => counts.lookup_misses += 1,
                Outcome::Malformed => counts.malformed += 1,
            }
        }
        Ok((buffer, counts))
    }

    fn assemble_job(&self, job: &AreaJob, buffer: &mut EntityBuffer) -> Result<Outcome, BufferError> {
        let mut assembler = self
            .max_segments
            .map_or_else(AreaAssembler::new, |limit| {
                AreaAssembler::new().with_max_segments(limit)
            });
        for way in &job.ways {
            let Some(refs) = self.resolve_way(job.area_id, *way) else {
                return Ok(Outcome::LookupMiss);
            };
            if let Err(err) = assembler.add_way(&refs) {
                warn!("Skipped area {}: {err}", job.area_id);
                return Ok(Outcome::Malformed);
            }
        }

        let area = match assembler.assemble() {
            Ok(area) if !area.is_empty() => area,
            Ok(_) => {
                warn!("Skipped area {}: no ring encloses any space", job.area_id);
                return Ok(Outcome::Malformed);
            }
            Err(err) => {
                warn!("Skipped area {}: {err}", job.area_id);
                return Ok(Outcome::Malformed);
            }
        };

        let mut header = EntityHeader::new(EntityKind::Area, job.area_id).with_user(&job.origin.user);
        header.version = job.origin.version;
        header.changeset = job.origin.changeset;
        header.timestamp = job.origin.timestamp;
        header.uid = job.origin.uid;
        let tags = job.tags.iter().map(|(key, value)| (key.as_str(), value.as_str()));
        area.write_to(buffer, &header, tags)?;
        debug!(
            "Built area {} with {} rings from {} ways",
            job.area_id,
            area.rings().len(),
            job.ways.len()
        );
        Ok(Outcome::Built)
    }

    /// Locate every node of `way`, or report why it cannot be resolved.
    fn resolve_way(&self, area: i64, way: i64) -> Option<Vec<NodeRef>> {
        let Some(nodes) = self.candidates.way_nodes(way) else {
            warn!("Skipped area {area}: way {way} is missing from the input");
            return None;
        };
        let mut refs = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.index.get(*node) {
                Ok(location) => refs.push(NodeRef::new(*node, location)),
                Err(err) => {
                    warn!("Skipped area {area}: node lookup for way {way} failed: {err}");
                    return None;
                }
            }
        }
        Some(refs)
    }
}
