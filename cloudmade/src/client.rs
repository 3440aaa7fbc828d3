use bytes::Bytes;

use crate::connection::Connection;
use crate::error::Result;
use crate::geocoding::{FindOptions, GeoResult, GeoResults, GeocodingService};
use crate::geometry::{BBox, Point};
use crate::routing::{Route, RouteOptions, RoutingService};
use crate::static_map::{MapRequest, StaticMapService};
use crate::tile::TileService;
use crate::vector_stream::{VectorOptions, VectorStreamService, VectorTileOptions};

/// All CloudMade's services, sharing one [`Connection`].
#[derive(Debug, Clone)]
pub struct Client {
    connection: Connection,
    tile: TileService,
    geocoding: GeocodingService,
    routing: RoutingService,
    vector_stream: VectorStreamService,
    static_map: StaticMapService,
}

impl Client {
    /// Client of `cloudmade.com`.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_connection(Connection::new(api_key)?))
    }

    pub fn with_connection(connection: Connection) -> Self {
        Self {
            tile: TileService::new(connection.clone()),
            geocoding: GeocodingService::new(connection.clone()),
            routing: RoutingService::new(connection.clone()),
            vector_stream: VectorStreamService::new(connection.clone()),
            static_map: StaticMapService::new(connection.clone()),
            connection,
        }
    }

    /// See [`Connection::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_connection(Connection::from_env()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn tile(&self) -> &TileService {
        &self.tile
    }

    pub fn geocoding(&self) -> &GeocodingService {
        &self.geocoding
    }

    pub fn routing(&self) -> &RoutingService {
        &self.routing
    }

    pub fn vector_stream(&self) -> &VectorStreamService {
        &self.vector_stream
    }

    pub fn static_map(&self) -> &StaticMapService {
        &self.static_map
    }

    /// PNG tile in the default style and size. Use [`Client::tile`] for anything else.
    pub async fn get_tile(&self, lat: f64, lon: f64, zoom: u8) -> Result<Bytes> {
        self.tile.get_tile(lat, lon, zoom).await
    }

    pub async fn find(&self, query: &str, options: &FindOptions) -> Result<GeoResults> {
        self.geocoding.find(query, options).await
    }

    pub async fn find_closest(
        &self,
        object_type: &str,
        point: Point,
        return_geometry: bool,
        return_location: bool,
    ) -> Result<Option<GeoResult>> {
        self.geocoding
            .find_closest(object_type, point, return_geometry, return_location)
            .await
    }

    pub async fn route(&self, start: Point, end: Point, options: &RouteOptions) -> Result<Route> {
        self.routing.route(start, end, options).await
    }

    pub async fn get_tile_from_bbox(
        &self,
        bbox: BBox,
        data_type: Option<&str>,
        options: &VectorOptions,
    ) -> Result<Bytes> {
        self.vector_stream
            .get_tile_from_bbox(bbox, data_type, options)
            .await
    }

    pub async fn get_tile_from_coords(
        &self,
        lat: f64,
        lon: f64,
        zoom: u8,
        options: &VectorTileOptions,
    ) -> Result<Bytes> {
        self.vector_stream
            .get_tile_from_coords(lat, lon, zoom, options)
            .await
    }

    pub async fn get_static_map(&self, map: &MapRequest) -> Result<Bytes> {
        self.static_map.get_map(map).await
    }
}
