#![doc = include_str!("../README.md")]
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

mod client;
pub mod connection;
mod error;
pub mod geocoding;
pub mod geometry;
mod mercator;
pub mod routing;
mod service;
pub mod static_map;
#[cfg(test)]
mod testing;
pub mod tile;
pub mod vector_stream;

pub use client::Client;
pub use connection::{Connection, HttpOptions, HttpTransport, Transport};
pub use error::{Error, Result};
pub use geometry::{
    BBox, CoordinateOrder, Geometry, Line, MultiLine, MultiPolygon, Point, Polygon, lat_lon,
    lon_lat,
};
pub use mercator::{
    InvalidTileSize, InvalidZoom, TileId, TileSize, Zoom, latlon_to_tile, tile_to_latlon,
    total_tiles,
};
pub use service::Service;
