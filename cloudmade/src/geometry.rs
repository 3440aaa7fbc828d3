//! Geometry value types, used both in requests and in parsed responses.
//!
//! CloudMade speaks a GeoJSON-like dialect, but unlike GeoJSON it lists coordinates as
//! `[latitude, longitude]` by default. Every parser here therefore takes an explicit
//! [`CoordinateOrder`].

use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};

/// Order in which a coordinate pair is written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateOrder {
    /// `[latitude, longitude]`, CloudMade's default.
    #[default]
    LatLon,
    /// `[longitude, latitude]`, as in GeoJSON.
    LonLat,
}

impl CoordinateOrder {
    /// Read the order from the `crs` member of a response, e.g.
    /// `{"type": "EPSG", "properties": {"code": 4326, "coordinate_order": [0, 1]}}`.
    pub fn from_crs(crs: &Value) -> Option<Self> {
        let order = crs.get("properties")?.get("coordinate_order")?.as_array()?;
        match (order.first()?.as_u64()?, order.get(1)?.as_u64()?) {
            (0, 1) => Some(Self::LatLon),
            (1, 0) => Some(Self::LonLat),
            _ => None,
        }
    }

    fn point(self, first: f64, second: f64) -> Point {
        match self {
            Self::LatLon => lat_lon(first, second),
            Self::LonLat => lon_lat(first, second),
        }
    }
}

/// Geographical position with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

/// Construct [`Point`] from latitude and longitude.
pub fn lat_lon(lat: f64, lon: f64) -> Point {
    Point { lat, lon }
}

/// Construct [`Point`] from longitude and latitude. Note that CloudMade, like most people,
/// writes coordinates starting with the latitude (e.g. `51.51695,-0.12652` is the New Oxford
/// Street in London).
pub fn lon_lat(lon: f64, lat: f64) -> Point {
    Point { lat, lon }
}

impl Point {
    /// Parse `[a, b]`, or `[[a, b]]` which the service sometimes uses for single points.
    pub fn from_coordinates(value: &Value, order: CoordinateOrder) -> Result<Self> {
        match array(value)? {
            [single] => Self::from_coordinates(single, order),
            [first, second] => Ok(order.point(number(first)?, number(second)?)),
            _ => Err(Error::invalid_response(format!(
                "expected a coordinate pair, got {value}"
            ))),
        }
    }

    /// Text representation in given order, as used in request URLs.
    pub fn to_url(&self, order: CoordinateOrder) -> String {
        match order {
            CoordinateOrder::LatLon => format!("{},{}", self.lat, self.lon),
            CoordinateOrder::LonLat => format!("{},{}", self.lon, self.lat),
        }
    }
}

/// `lat,lon`
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for Point {
    /// Tuple is taken as `(lat, lon)`.
    fn from((lat, lon): (f64, f64)) -> Self {
        lat_lon(lat, lon)
    }
}

/// Ordered sequence of points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub points: Vec<Point>,
}

impl Line {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Parse either an array of pairs, `[[a, b], [a, b], ...]`, or a flat array with an even
    /// number of elements, `[a, b, a, b, ...]`.
    pub fn from_coordinates(value: &Value, order: CoordinateOrder) -> Result<Self> {
        let elements = array(value)?;

        let points = if elements.iter().all(Value::is_number) {
            if elements.len() % 2 != 0 {
                return Err(Error::invalid_response(format!(
                    "odd number of coordinates in {value}"
                )));
            }

            elements
                .chunks(2)
                .map(|pair| Ok(order.point(number(&pair[0])?, number(&pair[1])?)))
                .collect::<Result<_>>()?
        } else {
            elements
                .iter()
                .map(|point| Point::from_coordinates(point, order))
                .collect::<Result<_>>()?
        };

        Ok(Self { points })
    }
}

impl FromIterator<Point> for Line {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiLine {
    pub lines: Vec<Line>,
}

impl MultiLine {
    pub fn from_coordinates(value: &Value, order: CoordinateOrder) -> Result<Self> {
        let lines = array(value)?
            .iter()
            .map(|line| Line::from_coordinates(line, order))
            .collect::<Result<_>>()?;
        Ok(Self { lines })
    }
}

/// Closed shape, with optional holes cut out of it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub border_line: Line,
    pub holes: Vec<Line>,
}

impl Polygon {
    /// First ring is the border, the rest are holes.
    pub fn from_coordinates(value: &Value, order: CoordinateOrder) -> Result<Self> {
        let (border_line, holes) = array(value)?
            .split_first()
            .ok_or_else(|| Error::invalid_response("polygon without a border"))?;

        Ok(Self {
            border_line: Line::from_coordinates(border_line, order)?,
            holes: holes
                .iter()
                .map(|hole| Line::from_coordinates(hole, order))
                .collect::<Result<_>>()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon {
    pub polygons: Vec<Polygon>,
}

impl MultiPolygon {
    pub fn from_coordinates(value: &Value, order: CoordinateOrder) -> Result<Self> {
        let polygons = array(value)?
            .iter()
            .map(|polygon| Polygon::from_coordinates(polygon, order))
            .collect::<Result<_>>()?;
        Ok(Self { polygons })
    }
}

/// Bounding box made of its south-west and north-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub southwest: Point,
    pub northeast: Point,
}

impl BBox {
    pub fn new(southwest: Point, northeast: Point) -> Self {
        Self {
            southwest,
            northeast,
        }
    }

    /// Parse `[[a, b], [a, b]]`.
    pub fn from_coordinates(value: &Value, order: CoordinateOrder) -> Result<Self> {
        match array(value)? {
            [southwest, northeast] => Ok(Self::new(
                Point::from_coordinates(southwest, order)?,
                Point::from_coordinates(northeast, order)?,
            )),
            _ => Err(Error::invalid_response(format!(
                "bounding box needs exactly two corners, got {value}"
            ))),
        }
    }

    /// Both corners, each in given order: `a,b,c,d`.
    pub fn to_url(&self, order: CoordinateOrder) -> String {
        format!(
            "{},{}",
            self.southwest.to_url(order),
            self.northeast.to_url(order)
        )
    }
}

/// `lat,lon,lat,lon`
impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.southwest, self.northeast)
    }
}

/// Any of the geometries the service can return.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    Line(Line),
    MultiLine(MultiLine),
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl Geometry {
    /// Parse `{"type": "...", "coordinates": [...]}`. Type names are case-insensitive, since the
    /// service sends e.g. `POINT` and `MULTILINESTRING`. Unknown types yield `None`.
    pub fn from_json(value: &Value, order: CoordinateOrder) -> Result<Option<Self>> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_response(format!("geometry without a type: {value}")))?;

        let coordinates = value
            .get("coordinates")
            .ok_or_else(|| Error::invalid_response(format!("{kind} without coordinates")))?;

        let geometry = match kind.to_ascii_lowercase().as_str() {
            "point" => Self::Point(Point::from_coordinates(coordinates, order)?),
            "linestring" => Self::Line(Line::from_coordinates(coordinates, order)?),
            "multilinestring" => Self::MultiLine(MultiLine::from_coordinates(coordinates, order)?),
            "polygon" => Self::Polygon(Polygon::from_coordinates(coordinates, order)?),
            "multipolygon" => {
                Self::MultiPolygon(MultiPolygon::from_coordinates(coordinates, order)?)
            }
            _ => {
                log::warn!("Unsupported geometry type '{kind}', ignoring.");
                return Ok(None);
            }
        };

        Ok(Some(geometry))
    }
}

fn array(value: &Value) -> Result<&[Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::invalid_response(format!("expected an array, got {value}")))
}

fn number(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::invalid_response(format!("expected a number, got {value}")))
}

// Conversions into `geo_types`, so results can be fed into the georust ecosystem.
// Note that `geo_types` uses x for longitude and y for latitude.

impl From<Point> for geo_types::Coord {
    fn from(point: Point) -> Self {
        geo_types::coord! { x: point.lon, y: point.lat }
    }
}

impl From<Point> for geo_types::Point {
    fn from(point: Point) -> Self {
        geo_types::Point::new(point.lon, point.lat)
    }
}

impl From<geo_types::Point> for Point {
    fn from(point: geo_types::Point) -> Self {
        lon_lat(point.x(), point.y())
    }
}

impl From<Line> for geo_types::LineString {
    fn from(line: Line) -> Self {
        line.points.into_iter().map(geo_types::Coord::from).collect()
    }
}

impl From<MultiLine> for geo_types::MultiLineString {
    fn from(multi_line: MultiLine) -> Self {
        multi_line
            .lines
            .into_iter()
            .map(geo_types::LineString::from)
            .collect()
    }
}

impl From<Polygon> for geo_types::Polygon {
    fn from(polygon: Polygon) -> Self {
        geo_types::Polygon::new(
            polygon.border_line.into(),
            polygon.holes.into_iter().map(Into::into).collect(),
        )
    }
}

impl From<MultiPolygon> for geo_types::MultiPolygon {
    fn from(multi_polygon: MultiPolygon) -> Self {
        multi_polygon
            .polygons
            .into_iter()
            .map(geo_types::Polygon::from)
            .collect()
    }
}

impl From<BBox> for geo_types::Rect {
    fn from(bbox: BBox) -> Self {
        geo_types::Rect::new(bbox.southwest, bbox.northeast)
    }
}

impl From<Geometry> for geo_types::Geometry {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Point(point) => geo_types::Geometry::Point(point.into()),
            Geometry::Line(line) => geo_types::Geometry::LineString(line.into()),
            Geometry::MultiLine(lines) => geo_types::Geometry::MultiLineString(lines.into()),
            Geometry::Polygon(polygon) => geo_types::Geometry::Polygon(polygon.into()),
            Geometry::MultiPolygon(polygons) => {
                geo_types::Geometry::MultiPolygon(polygons.into())
            }
        }
    }
}
