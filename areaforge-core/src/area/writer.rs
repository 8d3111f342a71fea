//! Conversions between assembled areas, area records and `geo` geometry.

use geo::{MultiPolygon, Polygon};

use super::{AssembledArea, Ring, RingRole};
use crate::buffer::{BufferError, EntityBuffer, EntityHandle, EntityHeader, EntityKind, EntityView};

impl AssembledArea {
    /// Append the rings to `buffer` as one area entity carrying `tags`.
    ///
    /// The header's kind is replaced with [`EntityKind::Area`].
    ///
    /// # Errors
    ///
    /// Propagates [`BufferError`]s; the record is rolled back on failure.
    pub fn write_to<'t, I>(
        &self,
        buffer: &mut EntityBuffer,
        header: &EntityHeader<'_>,
        tags: I,
    ) -> Result<EntityHandle, BufferError>
    where
        I: IntoIterator<Item = (&'t str, &'t str)>,
    {
        let area_header = EntityHeader {
            kind: EntityKind::Area,
            ..*header
        };
        let mut area = buffer.builder(&area_header)?;
        area.add_tags(tags)?;
        for ring in &self.rings {
            area.add_ring(ring.role(), ring.nodes())?;
        }
        area.commit()
    }

    /// Rebuild the rings stored in an area record.
    ///
    /// Inner rings are attached to the closest preceding outer ring.
    #[must_use]
    pub fn from_view(view: &EntityView<'_>) -> Self {
        let mut rings = Vec::new();
        let mut current_outer = None;
        for stored in view.rings() {
            let parent = match stored.role() {
                RingRole::Outer => {
                    current_outer = Some(rings.len());
                    None
                }
                RingRole::Inner => current_outer,
            };
            rings.push(Ring::new(stored.refs().collect(), stored.role(), parent));
        }
        Self { rings }
    }

    /// Polygons in degrees, one per outer ring.
    #[must_use]
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        self.outers()
            .map(|(index, outer)| {
                Polygon::new(
                    outer.to_line_string(),
                    self.inners_of(index).map(Ring::to_line_string).collect(),
                )
            })
            .collect()
    }
}

impl From<&AssembledArea> for MultiPolygon<f64> {
    fn from(area: &AssembledArea) -> Self {
        area.to_multi_polygon()
    }
}
