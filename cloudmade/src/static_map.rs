//! Static map images with optional markers and paths drawn over them.
//! <http://developers.cloudmade.com/projects/show/static-maps>

use std::fmt;

use bytes::Bytes;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::geometry::{BBox, Line, Point};
use crate::mercator::Zoom;
use crate::service::{QueryString, Service, encode_parameter};

pub const SUBDOMAIN: &str = "staticmaps";

/// Part of the world to be shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Area {
    BBox(BBox),
    Center { center: Point, zoom: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// 8-bit PNG, the service's default.
    Png,
    /// 32-bit PNG.
    Png32,
    Jpg,
    Gif,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Png32 => "png32",
            Self::Jpg => "jpg",
            Self::Gif => "gif",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSize {
    Small,
    Mid,
    Big,
}

impl fmt::Display for MarkerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Small => "small",
            Self::Mid => "mid",
            Self::Big => "big",
        })
    }
}

/// Symbol drawn on the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerLabel {
    /// Sent upper-cased.
    Letter(char),
    /// 1 to 99.
    Number(u8),
}

impl MarkerLabel {
    fn to_url(self) -> Result<String> {
        match self {
            Self::Letter(letter) if letter.is_ascii_alphabetic() => {
                Ok(letter.to_ascii_uppercase().to_string())
            }
            Self::Number(number) if (1..=99).contains(&number) => Ok(number.to_string()),
            other => Err(Error::invalid_argument(format!(
                "marker label must be a letter or a number within 1..=99, got {other:?}"
            ))),
        }
    }
}

/// Background color of the marker's label. Yellow when not given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Red,
    Lavender,
    LightBlue,
    DarkBlue,
    Green,
    Grey,
    Orange,
    White,
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Red => "red",
            Self::Lavender => "lavender",
            Self::LightBlue => "lightblue",
            Self::DarkBlue => "darkblue",
            Self::Green => "green",
            Self::Grey => "grey",
            Self::Orange => "orange",
            Self::White => "white",
        })
    }
}

/// Pin placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Point,
    pub size: Option<MarkerSize>,
    pub label: Option<MarkerLabel>,
    pub color: Option<MarkerColor>,
    /// From 0 (invisible) to 1 (opaque).
    pub opacity: Option<f64>,
    /// URL of a custom marker image.
    pub image: Option<String>,
}

impl Marker {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            size: None,
            label: None,
            color: None,
            opacity: None,
            image: None,
        }
    }

    /// `size:mid|label:A|color:red|opacity:0.5|url:http://...|lat,lon`
    fn to_url(&self) -> Result<String> {
        let mut parts = Vec::new();

        if let Some(size) = self.size {
            parts.push(format!("size:{size}"));
        }
        if let Some(label) = self.label {
            parts.push(format!("label:{}", label.to_url()?));
        }
        if let Some(color) = self.color {
            parts.push(format!("color:{color}"));
        }
        if let Some(opacity) = self.opacity {
            parts.push(format!("opacity:{}", check_opacity(opacity)?));
        }
        if let Some(image) = &self.image {
            parts.push(format!("url:{}", encode_parameter(image)));
        }
        parts.push(self.position.to_string());

        Ok(parts.join("|"))
    }
}

/// Line or polygon drawn over the map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub points: Vec<Point>,
    /// Predefined color name or 24-bit hex value, e.g. `orange` or `0x6faaff`. Black by default.
    pub color: Option<String>,
    /// Thickness in pixels.
    pub weight: Option<u32>,
    pub opacity: Option<f64>,
    /// Fill color, making the path a polygon.
    pub fill: Option<String>,
    pub fill_opacity: Option<f64>,
}

impl Path {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    /// `color:..|weight:..|opacity:..|fill:..|fill-opacity:..|lat,lon|lat,lon`
    fn to_url(&self) -> Result<String> {
        if self.points.is_empty() {
            return Err(Error::invalid_argument("path needs at least one point"));
        }

        let mut parts = Vec::new();

        if let Some(color) = &self.color {
            parts.push(format!("color:{}", encode_parameter(color)));
        }
        if let Some(weight) = self.weight {
            parts.push(format!("weight:{weight}"));
        }
        if let Some(opacity) = self.opacity {
            parts.push(format!("opacity:{}", check_opacity(opacity)?));
        }
        if let Some(fill) = &self.fill {
            parts.push(format!("fill:{}", encode_parameter(fill)));
        }
        if let Some(fill_opacity) = self.fill_opacity {
            parts.push(format!("fill-opacity:{}", check_opacity(fill_opacity)?));
        }
        parts.extend(self.points.iter().map(Point::to_string));

        Ok(parts.join("|"))
    }
}

impl From<Line> for Path {
    fn from(line: Line) -> Self {
        Self::new(line.points)
    }
}

fn check_opacity(opacity: f64) -> Result<f64> {
    if (0. ..=1.).contains(&opacity) {
        Ok(opacity)
    } else {
        Err(Error::invalid_argument(format!(
            "opacity must be within 0..=1, got {opacity}"
        )))
    }
}

/// Everything needed to render a static map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    /// Width and height in pixels.
    pub size: (u32, u32),
    pub area: Area,
    pub format: Option<ImageFormat>,
    pub style_id: Option<u32>,
    pub markers: Vec<Marker>,
    pub paths: Vec<Path>,
}

impl MapRequest {
    /// 800x600 map of given area.
    pub fn new(area: Area) -> Self {
        Self {
            size: (800, 600),
            area,
            format: None,
            style_id: None,
            markers: Vec::new(),
            paths: Vec::new(),
        }
    }

    pub fn to_request(&self) -> Result<String> {
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Err(Error::invalid_argument(format!(
                "map size must not be empty, got {width}x{height}"
            )));
        }

        let mut params = QueryString::default();
        params.push("size", format!("{width}x{height}"));

        match self.area {
            Area::BBox(bbox) => {
                params.push("bbox", bbox);
            }
            Area::Center { center, zoom } => {
                params
                    .push("center", center)
                    .push("zoom", u8::from(Zoom::try_from(zoom)?));
            }
        }

        params
            .push_opt("format", self.format)
            .push_opt("styleid", self.style_id);

        for marker in &self.markers {
            params.push("marker", marker.to_url()?);
        }

        for path in &self.paths {
            params.push("path", path.to_url()?);
        }

        Ok(format!("/staticmap?{params}"))
    }
}

/// CloudMade's static maps service.
#[derive(Debug, Clone)]
pub struct StaticMapService {
    service: Service,
}

impl StaticMapService {
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

    /// Render the map and return the image as is.
    pub async fn get_map(&self, map: &MapRequest) -> Result<Bytes> {
        let request = map.to_request()?;
        let image = self.service.connect(&request).await?;
        log::debug!("Got {} bytes of static map.", image.len());
        Ok(image)
    }
}
