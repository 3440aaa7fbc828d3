//! Project the lat/lon coordinates into tile numbers using the Web Mercator.
//! <https://en.wikipedia.org/wiki/Web_Mercator_projection>
//! <https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames>

use std::f64::consts::PI;

use crate::geometry::{Point, lat_lon};

// zoom level   tile coverage  number of tiles  tile size(*) in degrees
// 0            1 tile         1 tile           360° x 170.1022°
// 1            2 × 2 tiles    4 tiles          180° x 85.0511°
// 2            4 × 4 tiles    16 tiles         90° x [variable]

/// Number of tiles along each axis at given zoom.
pub fn total_tiles(zoom: u8) -> f64 {
    2f64.powi(zoom.into())
}

/// Project the position into the Mercator projection and normalize it to 0-1 range.
fn mercator_normalized(lat: f64, lon: f64) -> (f64, f64) {
    // Project into Mercator (cylindrical map projection).
    let x = lon.to_radians();
    let y = lat.to_radians().tan().asinh();

    // Scale both x and y to 0-1 range.
    let x = (1. + (x / PI)) / 2.;
    let y = (1. - (y / PI)) / 2.;

    (x, y)
}

/// Coordinates of the OSM-like tile.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct TileId {
    /// X number of the tile.
    pub x: u32,

    /// Y number of the tile.
    pub y: u32,

    /// Zoom level, where 0 means the whole world in one tile.
    /// See: <https://wiki.openstreetmap.org/wiki/Zoom_levels>
    pub zoom: u8,
}

impl TileId {
    pub fn valid(&self) -> bool {
        let total = total_tiles(self.zoom);
        f64::from(self.x) < total && f64::from(self.y) < total
    }

    /// Geographical position of the north-west corner of this tile.
    pub fn north_west(&self) -> Point {
        tile_to_latlon(f64::from(self.x), f64::from(self.y), self.zoom)
    }
}

/// Calculate the tile containing given position.
pub fn latlon_to_tile(lat: f64, lon: f64, zoom: u8) -> TileId {
    let (x, y) = mercator_normalized(lat, lon);

    // Map that into a big bitmap made out of web tiles. The east edge and the poles would
    // land one tile past the map.
    let number_of_tiles = total_tiles(zoom);
    let last = number_of_tiles - 1.;
    let x = (x * number_of_tiles).floor().clamp(0., last) as u32;
    let y = (y * number_of_tiles).floor().clamp(0., last) as u32;

    TileId { x, y, zoom }
}

/// Transform (possibly fractional) tile numbers back into a geographical position.
pub fn tile_to_latlon(x: f64, y: f64, zoom: u8) -> Point {
    let number_of_tiles = total_tiles(zoom);

    let lon = x / number_of_tiles * 360. - 180.;

    let lat = y / number_of_tiles;
    let lat = (PI * (1. - 2. * lat)).sinh().atan().to_degrees();

    lat_lon(lat, lon)
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid zoom level {0}, must be within 0..={max}", max = Zoom::MAX)]
pub struct InvalidZoom(pub u8);

/// Zoom level accepted by the tile services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom(u8);

impl Zoom {
    /// CloudMade renders up to zoom 18.
    pub const MAX: u8 = 18;
}

impl TryFrom<u8> for Zoom {
    type Error = InvalidZoom;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::MAX {
            Err(InvalidZoom(value))
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Zoom> for u8 {
    fn from(zoom: Zoom) -> Self {
        zoom.0
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid tile size {0}, must be a power of two within 32..=256")]
pub struct InvalidTileSize(pub u32);

/// Length of a tile's side in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSize(u32);

impl Default for TileSize {
    fn default() -> Self {
        Self(256)
    }
}

impl TryFrom<u32> for TileSize {
    type Error = InvalidTileSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value.is_power_of_two() && (32..=256).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidTileSize(value))
        }
    }
}

impl From<TileSize> for u32 {
    fn from(size: TileSize) -> Self {
        size.0
    }
}
