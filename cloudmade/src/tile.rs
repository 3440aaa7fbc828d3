//! Raster map tiles.
//! <http://developers.cloudmade.com/projects/tiles/documents>

use bytes::Bytes;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::mercator::{TileId, TileSize, Zoom, latlon_to_tile};
use crate::service::Service;

pub const SUBDOMAIN: &str = "tile";

/// Default style, CloudMade's "The Original".
pub const DEFAULT_STYLE: u32 = 1;

/// CloudMade's tile service, rendering PNG tiles in given style.
#[derive(Debug, Clone)]
pub struct TileService {
    service: Service,
    style_id: u32,
    tile_size: TileSize,
}

impl TileService {
    pub fn new(connection: Connection) -> Self {
        Self::with_subdomain(connection, None)
    }

    /// Use a different subdomain, for service versioning only.
    pub fn with_subdomain(connection: Connection, subdomain: Option<&str>) -> Self {
        Self {
            service: Service::new(connection, subdomain, SUBDOMAIN),
            style_id: DEFAULT_STYLE,
            tile_size: TileSize::default(),
        }
    }

    /// Style from CloudMade's style editor.
    pub fn with_style(mut self, style_id: u32) -> Self {
        self.style_id = style_id;
        self
    }

    /// Fails for sizes other than powers of two in 32..=256.
    pub fn with_tile_size(mut self, tile_size: u32) -> Result<Self> {
        self.tile_size = TileSize::try_from(tile_size)?;
        Ok(self)
    }

    pub fn style_id(&self) -> u32 {
        self.style_id
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size.into()
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Request of given tile, e.g. `/1/256/15/19524/15367.png`.
    pub fn tile_request(&self, tile_id: TileId) -> String {
        format!(
            "/{}/{}/{}/{}/{}.png",
            self.style_id,
            self.tile_size(),
            tile_id.zoom,
            tile_id.x,
            tile_id.y
        )
    }

    /// Download PNG tile containing given position.
    pub async fn get_tile(&self, lat: f64, lon: f64, zoom: u8) -> Result<Bytes> {
        let zoom = Zoom::try_from(zoom)?;
        self.get_tile_by_id(latlon_to_tile(lat, lon, zoom.into()))
            .await
    }

    pub async fn get_tile_by_id(&self, tile_id: TileId) -> Result<Bytes> {
        Zoom::try_from(tile_id.zoom)?;
        if !tile_id.valid() {
            return Err(Error::invalid_argument(format!(
                "{tile_id:?} is outside of the map"
            )));
        }

        log::trace!("Fetching {tile_id:?}.");
        self.service.connect(&self.tile_request(tile_id)).await
    }
}
