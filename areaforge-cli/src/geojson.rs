//! GeoJSON rendering of assembled areas.
//!
//! Each area record becomes one `Feature` with a `MultiPolygon` geometry in
//! WGS84 degrees. Tags become string properties; the source object is
//! recorded under `@type` and `@id`. Geometry goes through `geojson`'s
//! `geo-types` conversion.

use std::io::Write;

use areaforge_core::{AssembledArea, EntityBuffer, EntityView};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};

/// Source object kind and identifier encoded in an area identifier.
fn source_of(area_id: i64) -> (&'static str, i64) {
    let source_id = area_id >> 1;
    if area_id & 1 == 0 {
        ("way", source_id)
    } else {
        ("relation", source_id)
    }
}

fn feature(view: &EntityView<'_>) -> Feature {
    let polygons = AssembledArea::from_view(view).to_multi_polygon();
    let mut feature = Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&polygons))),
        id: Some(Id::Number(view.id().into())),
        properties: None,
        foreign_members: None,
    };
    for (key, value) in view.tags() {
        feature.set_property(key, value);
    }
    let (source_kind, source_id) = source_of(view.id());
    feature.set_property("@type", source_kind);
    feature.set_property("@id", source_id);
    feature
}

/// Write every area in `areas` to `writer` as one feature collection.
///
/// # Errors
///
/// Returns the serialisation or IO failure raised while writing.
pub(crate) fn write_feature_collection<W: Write>(
    areas: &EntityBuffer,
    writer: W,
) -> Result<(), serde_json::Error> {
    let collection = GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features: areas.iter().map(|view| feature(&view)).collect(),
        foreign_members: None,
    });
    serde_json::to_writer(writer, &collection)
}
