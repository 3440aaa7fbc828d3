//! Vector stream: map data as SVG documents, either for a bounding box or for a tile.
//! <http://developers.cloudmade.com/projects/show/vector-stream-server>

use std::fmt;

use bytes::Bytes;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::geometry::BBox;
use crate::mercator::{TileSize, Zoom, latlon_to_tile};
use crate::service::{QueryString, Service, encode};

pub const SUBDOMAIN: &str = "alpha.vectors";

/// Highest number of decimal places the service can output.
pub const MAX_PRECISION: u8 = 15;

/// Type of coordinates in the SVG document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coords {
    Rel,
    Abs,
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rel => "rel",
            Self::Abs => "abs",
        })
    }
}

/// What to do with elements filtered out by the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unused {
    /// Keep them, but make them invisible.
    Hide,
    Remove,
}

impl fmt::Display for Unused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hide => "hide",
            Self::Remove => "remove",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorFormat {
    #[default]
    Svg,
    /// Gzipped SVG.
    Svgz,
}

impl fmt::Display for VectorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Svg => "svg",
            Self::Svgz => "svgz",
        })
    }
}

/// Controls the content of the returned document. Nothing is sent for options left as `None`,
/// letting the service use its defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputOptions {
    pub coords: Option<Coords>,
    /// Decimal places of the coordinates, 0..=15.
    pub precision: Option<u8>,
    pub unused: Option<Unused>,
    /// Leave out data from these areas.
    pub exclude: Vec<BBox>,
    /// Clip geometries to the requested area.
    pub clipped: Option<bool>,
    pub coastlines: Option<bool>,
}

impl OutputOptions {
    fn push_to(&self, params: &mut QueryString) -> Result<()> {
        if let Some(precision) = self.precision {
            if precision > MAX_PRECISION {
                return Err(Error::invalid_argument(format!(
                    "precision must be within 0..={MAX_PRECISION}, got {precision}"
                )));
            }
        }

        params
            .push_opt("coords", self.coords)
            .push_opt("precision", self.precision)
            .push_opt("unused", self.unused);

        for bbox in &self.exclude {
            params.push("exclude", bbox);
        }

        params
            .push_opt("clipped", self.clipped)
            .push_opt("coastlines", self.coastlines);

        Ok(())
    }
}

/// Options of [`VectorStreamService::get_tile_from_bbox`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorOptions {
    /// Width and height of the view port in pixels.
    pub viewport: Option<(u32, u32)>,
    /// Style used for filtering and styling. Data is returned as is without it.
    pub style_id: Option<u32>,
    /// Derived from the view port when not given.
    pub zoom: Option<u8>,
    pub output: OutputOptions,
}

/// Options of [`VectorStreamService::get_tile_from_coords`].
#[derive(Debug, Clone, PartialEq)]
pub struct VectorTileOptions {
    pub style_id: u32,
    pub tile_size: u32,
    pub format: VectorFormat,
    pub output: OutputOptions,
}

impl Default for VectorTileOptions {
    fn default() -> Self {
        Self {
            style_id: 1,
            tile_size: 256,
            format: VectorFormat::default(),
            output: OutputOptions::default(),
        }
    }
}

/// `/{bbox}/{data_type}/`, followed by the options if there are any.
pub fn bbox_request(
    bbox: BBox,
    data_type: Option<&str>,
    options: &VectorOptions,
) -> Result<String> {
    let mut params = QueryString::default();

    if let Some((width, height)) = options.viewport {
        params.push("viewport", format!("{width}x{height}"));
    }

    params.push_opt("styleid", options.style_id);

    if let Some(zoom) = options.zoom {
        params.push("zoom", u8::from(Zoom::try_from(zoom)?));
    }

    options.output.push_to(&mut params)?;

    let data_type = data_type.map_or_else(|| "*".to_owned(), encode);
    let mut request = format!("/{bbox}/{data_type}/");
    if !params.is_empty() {
        request.push_str(&format!("?{params}"));
    }
    Ok(request)
}

/// `/{style}/{size}/{zoom}/{x}/{y}.{format}`, followed by the options if there are any.
pub fn tile_request(
    lat: f64,
    lon: f64,
    zoom: u8,
    options: &VectorTileOptions,
) -> Result<String> {
    // There is no zoom 0 vector tile.
    let zoom = u8::from(Zoom::try_from(zoom.max(1))?);
    let tile_size = u32::from(TileSize::try_from(options.tile_size)?);
    let tile_id = latlon_to_tile(lat, lon, zoom);

    let mut params = QueryString::default();
    options.output.push_to(&mut params)?;

    let mut request = format!(
        "/{}/{tile_size}/{zoom}/{}/{}.{}",
        options.style_id, tile_id.x, tile_id.y, options.format
    );
    if !params.is_empty() {
        request.push_str(&format!("?{params}"));
    }
    Ok(request)
}

/// CloudMade's vector stream service.
#[derive(Debug, Clone)]
pub struct VectorStreamService {
    service: Service,
}

impl VectorStreamService {
    pub fn new(connection: Connection) -> Self {
        Self::with_subdomain(connection, None)
    }

    /// Use a different subdomain, for service versioning only.
    pub fn with_subdomain(connection: Connection, subdomain: Option<&str>) -> Self {
        Self {
            service: Service::new(connection, subdomain, SUBDOMAIN),
        }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Get the data within the bounding box. Without `data_type`, everything is returned.
    pub async fn get_tile_from_bbox(
        &self,
        bbox: BBox,
        data_type: Option<&str>,
        options: &VectorOptions,
    ) -> Result<Bytes> {
        let request = bbox_request(bbox, data_type, options)?;
        self.service.connect(&request).await
    }

    /// Get the tile containing given position.
    pub async fn get_tile_from_coords(
        &self,
        lat: f64,
        lon: f64,
        zoom: u8,
        options: &VectorTileOptions,
    ) -> Result<Bytes> {
        let request = tile_request(lat, lon, zoom, options)?;
        self.service.connect(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::lat_lon;
    use crate::testing::{RecordingTransport, connection};

    #[tokio::test]
    async fn tile_from_bbox() {
        let _ = env_logger::try_init();

        let transport = RecordingTransport::responding("SVGZ file content");
        let vectors = VectorStreamService::new(connection(&transport));
        let bbox = BBox::new(lat_lon(-0.029055, 51.486895), lat_lon(-0.090424, 51.510023));

        let tile = vectors
            .get_tile_from_bbox(bbox, Some("line"), &VectorOptions::default())
            .await
            .unwrap();

        assert_eq!(&tile[..], b"SVGZ file content");
        assert_eq!(
            transport.last_request().as_deref(),
            Some(
                "http://alpha.vectors.fake.url/FAKE_API_KEY/\
                 -0.029055,51.486895,-0.090424,51.510023/line/"
            )
        );
    }

    #[test]
    fn data_type_is_encoded() {
        let bbox = BBox::new(lat_lon(51.5, -0.1), lat_lon(51.6, 0.));
        assert_eq!(
            bbox_request(bbox, Some("line/../poi?x"), &VectorOptions::default()).unwrap(),
            "/51.5,-0.1,51.6,0/line%2F..%2Fpoi%3Fx/"
        );
    }

    #[test]
    fn bbox_with_all_options() {
        let bbox = BBox::new(lat_lon(51.5, -0.1), lat_lon(51.6, 0.));
        let options = VectorOptions {
            viewport: Some((800, 600)),
            style_id: Some(2),
            zoom: Some(14),
            output: OutputOptions {
                coords: Some(Coords::Rel),
                precision: Some(5),
                unused: Some(Unused::Hide),
                exclude: vec![
                    BBox::new(lat_lon(51.5, -0.1), lat_lon(51.52, -0.08)),
                    BBox::new(lat_lon(51.55, -0.05), lat_lon(51.56, -0.04)),
                ],
                clipped: Some(true),
                coastlines: Some(false),
            },
        };

        assert_eq!(
            bbox_request(bbox, None, &options).unwrap(),
            "/51.5,-0.1,51.6,0/*/?viewport=800x600&styleid=2&zoom=14&coords=rel&precision=5\
             &unused=hide&exclude=51.5,-0.1,51.52,-0.08&exclude=51.55,-0.05,51.56,-0.04\
             &clipped=true&coastlines=false"
        );
    }

    #[tokio::test]
    async fn tile_from_coords() {
        let transport = RecordingTransport::responding("SVG file content");
        let vectors = VectorStreamService::new(connection(&transport));

        let options = VectorTileOptions {
            format: VectorFormat::Svgz,
            output: OutputOptions {
                clipped: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        vectors
            .get_tile_from_coords(11.1, 34.5, 15, &options)
            .await
            .unwrap();

        assert_eq!(
            transport.last_request().as_deref(),
            Some(
                "http://alpha.vectors.fake.url/FAKE_API_KEY/\
                 1/256/15/19524/15367.svgz?clipped=true"
            )
        );
    }

    #[test]
    fn zoom_0_is_raised_to_1() {
        assert_eq!(
            tile_request(0., 0., 0, &VectorTileOptions::default()).unwrap(),
            "/1/256/1/1/1.svg"
        );
    }

    #[test]
    fn edges_of_the_map_request_existing_tiles() {
        let options = VectorTileOptions::default();
        assert_eq!(tile_request(0., 180., 1, &options).unwrap(), "/1/256/1/1/1.svg");
        assert_eq!(tile_request(-89., 0., 1, &options).unwrap(), "/1/256/1/1/1.svg");
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = VectorTileOptions {
            output: OutputOptions {
                precision: Some(16),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            tile_request(0., 0., 5, &options),
            Err(Error::InvalidArgument(_))
        ));

        assert!(matches!(
            tile_request(0., 0., 19, &VectorTileOptions::default()),
            Err(Error::Zoom(_))
        ));
    }
}
