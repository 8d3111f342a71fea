//! OSM PBF decoding into entity buffers.
//!
//! [`PbfSource`] reads one file block per [`BufferSource::read`] call and
//! writes the accepted elements, with their metadata, tags, way node
//! identifiers and relation members, into a fresh [`EntityBuffer`]. Blocks
//! that contribute nothing after filtering are skipped so an empty buffer
//! only ever means end of input.

use std::fs::File;
use std::io::{BufReader, Read};

use areaforge_core::{BufferError, BufferSource, EntityBuffer, EntityFilter};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use osmpbf::{BlobDecode, BlobReader};
use thiserror::Error;

mod element;

/// Errors raised while reading an OSM PBF file.
#[derive(Debug, Error)]
pub enum PbfSourceError {
    /// The file could not be opened.
    #[error("failed to open OSM PBF file at {path}")]
    Open {
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
        /// Path that was opened.
        path: Utf8PathBuf,
    },
    /// A block could not be decoded.
    #[error("failed to decode OSM PBF data at {path}")]
    Decode {
        /// Underlying decoder failure.
        #[source]
        source: osmpbf::Error,
        /// Path being decoded.
        path: Utf8PathBuf,
    },
    /// A decoded element could not be written.
    #[error("failed to buffer OSM PBF data from {path}")]
    Buffer {
        /// Underlying buffer failure.
        #[source]
        source: BufferError,
        /// Path being decoded.
        path: Utf8PathBuf,
    },
}

/// [`BufferSource`] backed by an OSM PBF stream.
///
/// # Examples
/// ```no_run
/// use areaforge_core::{BufferSource, EntityFilter};
/// use areaforge_data::PbfSource;
/// use camino::Utf8Path;
///
/// # fn main() -> Result<(), areaforge_data::PbfSourceError> {
/// let mut source = PbfSource::open(Utf8Path::new("city.osm.pbf"), EntityFilter::ALL)?;
/// loop {
///     let buffer = source.read()?;
///     if buffer.is_empty() {
///         break;
///     }
///     println!("{} entities", buffer.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PbfSource<R: Read + Send> {
    blobs: BlobReader<R>,
    filter: EntityFilter,
    path: Utf8PathBuf,
    capacity_limit: Option<usize>,
}

impl PbfSource<BufReader<File>> {
    /// Open `path` for decoding.
    ///
    /// # Errors
    ///
    /// Returns [`PbfSourceError::Open`] when the file cannot be opened.
    pub fn open(path: &Utf8Path, filter: EntityFilter) -> Result<Self, PbfSourceError> {
        let file = areaforge_fs::open_input(path).map_err(|source| PbfSourceError::Open {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(Self::new(
            BufReader::new(file.into_std()),
            path.to_path_buf(),
            filter,
        ))
    }
}

impl<R: Read + Send> PbfSource<R> {
    /// Decode PBF data from `reader`; `path` labels errors.
    #[must_use]
    pub fn new(reader: R, path: Utf8PathBuf, filter: EntityFilter) -> Self {
        Self {
            blobs: BlobReader::new(reader),
            filter,
            path,
            capacity_limit: None,
        }
    }

    /// Bound the size of each produced buffer.
    #[must_use]
    pub const fn with_capacity_limit(mut self, limit: usize) -> Self {
        self.capacity_limit = Some(limit);
        self
    }

    /// Path labelling this source.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn fresh_buffer(&self) -> EntityBuffer {
        self.capacity_limit
            .map_or_else(EntityBuffer::new, EntityBuffer::with_capacity_limit)
    }

    fn decode_error(&self, source: osmpbf::Error) -> PbfSourceError {
        PbfSourceError::Decode {
            source,
            path: self.path.clone(),
        }
    }
}

impl<R: Read + Send> BufferSource for PbfSource<R> {
    type Error = PbfSourceError;

    fn read(&mut self) -> Result<EntityBuffer, Self::Error> {
        let mut buffer = self.fresh_buffer();
        while buffer.is_empty() {
            let Some(next) = self.blobs.next() else {
                break;
            };
            let blob = next.map_err(|source| self.decode_error(source))?;
            let decoded = blob.decode().map_err(|source| self.decode_error(source))?;
            let BlobDecode::OsmData(block) = decoded else {
                continue;
            };
            for element in block.elements() {
                element::append(&mut buffer, &element, self.filter).map_err(|source| {
                    PbfSourceError::Buffer {
                        source,
                        path: self.path.clone(),
                    }
                })?;
            }
        }
        debug!(
            "Decoded {} entities ({} bytes) from {}",
            buffer.len(),
            buffer.byte_len(),
            self.path
        );
        Ok(buffer)
    }
}

impl<R: Read + Send> std::fmt::Debug for PbfSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PbfSource")
            .field("filter", &self.filter)
            .field("path", &self.path)
            .field("capacity_limit", &self.capacity_limit)
            .finish_non_exhaustive()
    }
}
