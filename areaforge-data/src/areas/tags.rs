//! Tag predicates deciding which ways and relations describe areas.
//!
//! - Relations qualify through `type=multipolygon` or `type=boundary`.
//! - Closed ways qualify through `area=yes` or an area-implying key, unless
//!   tagged `area=no`.

/// Owned key/value pairs copied onto an assembled area.
pub(super) type OwnedTags = Vec<(String, String)>;

pub(super) fn is_area_relation<'a, T>(tags: T) -> bool
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter()
        .any(|(key, value)| key == "type" && matches!(value, "multipolygon" | "boundary"))
}

pub(super) fn is_area_way<'a, T>(tags: T) -> bool
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut implied = false;
    for (key, value) in tags {
        if key == "area" {
            match value {
                "no" => return false,
                "yes" => implied = true,
                _ => {}
            }
        } else if implies_area(key) {
            implied = true;
        }
    }
    implied
}

/// Keys whose presence on a closed way marks it as an area.
fn implies_area(key: &str) -> bool {
    matches!(
        key,
        "building" | "landuse" | "natural" | "leisure" | "amenity" | "water"
    )
}

/// Copy `tags`, dropping the relation `type` marker.
pub(super) fn area_tags<'a, T>(tags: T) -> OwnedTags
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter()
        .filter(|(key, _)| *key != "type")
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}
