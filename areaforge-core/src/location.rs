//! Fixed-precision coordinates.
//!
//! Locations store longitude and latitude as `i32` multiples of 1e-7 degrees
//! so equality and ordering are exact. Geometry code never compares
//! floating-point coordinates directly.

use std::fmt;

use geo::Coord;
use thiserror::Error;

/// Number of fixed-precision units per degree.
pub const COORDINATE_PRECISION: i32 = 10_000_000;

const UNDEFINED_COORDINATE: i32 = i32::MAX;

/// A coordinate pair with `x = longitude` and `y = latitude`.
///
/// Ordering is lexicographic: `x` first, then `y`. The undefined sentinel
/// sorts after every defined location.
///
/// # Examples
///
/// ```
/// use areaforge_core::Location;
///
/// # fn main() -> Result<(), areaforge_core::LocationError> {
/// let berlin = Location::from_degrees(13.404_954, 52.520_008)?;
/// assert_eq!(berlin.x(), 134_049_540);
/// assert!(Location::undefined() > berlin);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    x: i32,
    y: i32,
}

/// Errors returned by [`Location::from_degrees`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LocationError {
    /// A coordinate was NaN or infinite.
    #[error("coordinate ({lon}, {lat}) is not finite")]
    NotFinite {
        /// Longitude in degrees.
        lon: f64,
        /// Latitude in degrees.
        lat: f64,
    },
    /// A coordinate fell outside the WGS84 range.
    #[error("coordinate ({lon}, {lat}) is outside [-180, 180] x [-90, 90]")]
    OutOfRange {
        /// Longitude in degrees.
        lon: f64,
        /// Latitude in degrees.
        lat: f64,
    },
}

impl Location {
    /// Build a location from raw fixed-precision units.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The "no location" sentinel.
    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            x: UNDEFINED_COORDINATE,
            y: UNDEFINED_COORDINATE,
        }
    }

    /// Convert degrees to fixed precision, rounding to the nearest unit.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] when either value is non-finite or outside
    /// the WGS84 range.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        reason = "range is validated before scaling so the rounded value fits in i32"
    )]
    pub fn from_degrees(lon: f64, lat: f64) -> Result<Self, LocationError> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(LocationError::NotFinite { lon, lat });
        }
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(LocationError::OutOfRange { lon, lat });
        }
        let scale = f64::from(COORDINATE_PRECISION);
        Ok(Self {
            x: (lon * scale).round() as i32,
            y: (lat * scale).round() as i32,
        })
    }

    /// Whether this location carries a real coordinate.
    #[must_use]
    pub const fn is_defined(self) -> bool {
        self.x != UNDEFINED_COORDINATE && self.y != UNDEFINED_COORDINATE
    }

    /// Raw longitude units.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    /// Raw latitude units.
    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    /// Longitude in degrees.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "unit conversion to degrees")]
    pub fn lon(self) -> f64 {
        f64::from(self.x) / f64::from(COORDINATE_PRECISION)
    }

    /// Latitude in degrees.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "unit conversion to degrees")]
    pub fn lat(self) -> f64 {
        f64::from(self.y) / f64::from(COORDINATE_PRECISION)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::undefined()
    }
}

impl From<Location> for Coord<f64> {
    fn from(location: Location) -> Self {
        Self {
            x: location.lon(),
            y: location.lat(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_defined() {
            write!(f, "({:.7}, {:.7})", self.lon(), self.lat())
        } else {
            f.write_str("(undefined)")
        }
    }
}
