use crate::core::constants::{EARTH_RADIUS, MAX_LATITUDE};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Half the circumference of the Web Mercator world, in meters.
const MAX_COORD: f64 = EARTH_RADIUS * PI;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Clamps latitude to the range Web Mercator can represent
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Converts to Web Mercator projection (EPSG:3857), clamping the latitude
    pub fn to_mercator(&self) -> Point {
        let sin = Self::clamp_lat(self.lat).to_radians().sin();
        Point::new(
            EARTH_RADIUS * self.lng.to_radians(),
            EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
        )
    }

    /// Position in the unit world square: x grows eastward, y grows southward.
    ///
    /// Longitudes past the antimeridian wrap back into `[0, 1]`.
    pub fn to_normalized(&self) -> Point {
        let projected = self.to_mercator();
        let mut x = (projected.x + MAX_COORD) / (MAX_COORD * 2.0);
        let y = 1.0 - (projected.y + MAX_COORD) / (MAX_COORD * 2.0);
        if x > 1.0 {
            x -= x.floor();
        }
        Point::new(x, y)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or tile pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    pub fn distance_squared_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn floor(&self) -> Point {
        Point::new(self.x.floor(), self.y.floor())
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Wraps a tile column or row into `[0, 2^z)`, so tiles west of the
/// antimeridian address the same stored data as their eastern twins.
pub fn wrap(value: i64, z: u8) -> u32 {
    let dim = 1_i64 << z;
    value.rem_euclid(dim) as u32
}

/// Represents a tile coordinate in the slippy map tile system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Builds a coordinate from possibly out-of-range column/row values,
    /// wrapping both into the zoom's grid.
    pub fn wrapped(x: i64, y: i64, z: u8) -> Self {
        Self::new(wrap(x, z), wrap(y, z), z)
    }

    /// Canonical `"x:y:z"` key
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.x, self.y, self.z)
    }

    /// Gets the parent tile at a lower zoom level
    pub fn parent(&self) -> Option<TileCoord> {
        if self.z == 0 {
            None
        } else {
            Some(TileCoord::new(self.x / 2, self.y / 2, self.z - 1))
        }
    }

    /// Checks if the tile is valid for the given zoom level
    pub fn is_valid(&self) -> bool {
        let max_coord = 1_u64 << self.z;
        (self.x as u64) < max_coord && (self.y as u64) < max_coord
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(40.7128, -74.0060);
        assert_eq!(coord.lat, 40.7128);
        assert_eq!(coord.lng, -74.0060);
        assert!(coord.is_valid());
    }

    #[test]
    fn test_normalized_projection() {
        let origin = LatLng::new(0.0, 0.0).to_normalized();
        assert!((origin.x - 0.5).abs() < 1e-12);
        assert!((origin.y - 0.5).abs() < 1e-12);

        let north_west = LatLng::new(90.0, -180.0).to_normalized();
        assert!(north_west.x.abs() < 1e-12);
        assert!(north_west.y.abs() < 1e-6);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(-1, 2), 3);
        assert_eq!(wrap(4, 2), 0);
        assert_eq!(wrap(9, 3), 1);
        assert_eq!(wrap(2, 2), 2);
        assert_eq!(wrap(-5, 0), 0);
    }

    #[test]
    fn test_tile_key() {
        let tile = TileCoord::new(3, 5, 4);
        assert_eq!(tile.key(), "3:5:4");
        assert_eq!(tile.to_string(), "3:5:4");
        assert_eq!(TileCoord::wrapped(-1, 17, 4), TileCoord::new(15, 1, 4));
    }

    #[test]
    fn test_tile_validity() {
        assert!(TileCoord::new(0, 0, 0).is_valid());
        assert!(!TileCoord::new(1, 0, 0).is_valid());
        assert_eq!(TileCoord::new(5, 3, 3).parent(), Some(TileCoord::new(2, 1, 2)));
    }
}
