//! Routing: turn-by-turn directions between two points, optionally through some others.
//! <http://developers.cloudmade.com/projects/show/routing-http-api>

use std::fmt;

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::geometry::{CoordinateOrder, Line, Point, lat_lon};
use crate::service::{Service, encode};

pub const SUBDOMAIN: &str = "routes";

/// Version of the routing API this client speaks.
pub const API_VERSION: &str = "0.3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteType {
    #[default]
    Car,
    Foot,
    Bicycle,
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Car => "car",
            Self::Foot => "foot",
            Self::Bicycle => "bicycle",
        })
    }
}

/// Variant of the car route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteModifier {
    Shortest,
    Fastest,
}

impl fmt::Display for RouteModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shortest => "shortest",
            Self::Fastest => "fastest",
        })
    }
}

/// Units of the distances in the instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Km,
    Miles,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Km => "km",
            Self::Miles => "miles",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOptions {
    /// Points the route must go through, in order.
    pub transit_points: Vec<Point>,
    pub route_type: RouteType,
    /// Allowed only for [`RouteType::Car`].
    pub modifier: Option<RouteModifier>,
    /// Language of the instructions, as ISO 3166-1 alpha-2 code.
    pub lang: String,
    pub units: Units,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            transit_points: Vec::new(),
            route_type: RouteType::default(),
            modifier: None,
            lang: "en".to_owned(),
            units: Units::default(),
        }
    }
}

/// Build the request for a route in given output format (`js` or `gpx`).
fn route_request(
    start: Point,
    end: Point,
    options: &RouteOptions,
    format: &str,
) -> Result<String> {
    if options.modifier.is_some() && options.route_type != RouteType::Car {
        return Err(Error::invalid_argument(format!(
            "route modifiers apply to car routes only, not {}",
            options.route_type
        )));
    }

    let mut points = start.to_string();
    for transit in &options.transit_points {
        points.push_str(&format!(",[{transit}]"));
    }
    points.push_str(&format!(",{end}"));

    let mut route_type = options.route_type.to_string();
    if let Some(modifier) = options.modifier {
        route_type.push_str(&format!("/{modifier}"));
    }

    Ok(format!(
        "/api/{API_VERSION}/{points}/{route_type}.{format}?lang={}&units={}",
        encode(&options.lang),
        options.units
    ))
}

/// Compass direction of a route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarthDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl EarthDirection {
    fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "N" => Self::N,
            "NE" => Self::NE,
            "E" => Self::E,
            "SE" => Self::SE,
            "S" => Self::S,
            "SW" => Self::SW,
            "W" => Self::W,
            "NW" => Self::NW,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnType {
    /// Continue (go straight).
    Continue,
    Left,
    SlightLeft,
    SharpLeft,
    Right,
    SlightRight,
    SharpRight,
    UTurn,
}

impl TurnType {
    fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "C" => Self::Continue,
            "TL" => Self::Left,
            "TSLL" => Self::SlightLeft,
            "TSHL" => Self::SharpLeft,
            "TR" => Self::Right,
            "TSLR" => Self::SlightRight,
            "TSHR" => Self::SharpRight,
            "TU" | "U" => Self::UTurn,
            _ => return None,
        })
    }
}

/// Turn to be made at the start of an instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
    pub turn_type: TurnType,
    /// Angle in degrees.
    pub angle: f64,
}

/// Single step of the route, e.g. "Turn right at Falconrui".
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInstruction {
    pub instruction: String,
    /// Length of the segment in meters.
    pub length: f64,
    /// Index of the first point of the segment in [`Route::geometry`].
    pub position: usize,
    /// Estimated time in seconds.
    pub time: u64,
    /// Length formatted for humans, in requested units, e.g. "0.3 km".
    pub length_caption: String,
    pub earth_direction: EarthDirection,
    /// Degrees from north, clockwise.
    pub azimuth: f64,
    /// Missing for the first instruction.
    pub turn: Option<Turn>,
}

impl RouteInstruction {
    /// Parse an array of 7 elements, or 9 when it carries the turn.
    pub fn from_json(value: &Value) -> Result<Self> {
        let fields = value.as_array().ok_or_else(|| {
            Error::invalid_response(format!("instruction is not an array: {value}"))
        })?;

        if fields.len() != 7 && fields.len() != 9 {
            return Err(Error::invalid_response(format!(
                "instruction has {} fields, expected 7 or 9",
                fields.len()
            )));
        }

        let text = |i: usize| {
            fields[i]
                .as_str()
                .ok_or_else(|| {
                    Error::invalid_response(format!(
                        "field {i} of {value} is not a string"
                    ))
                })
        };
        let number = |i: usize| {
            fields[i]
                .as_f64()
                .ok_or_else(|| {
                    Error::invalid_response(format!(
                        "field {i} of {value} is not a number"
                    ))
                })
        };
        let integer = |i: usize| {
            fields[i]
                .as_u64()
                .ok_or_else(|| {
                    Error::invalid_response(format!(
                        "field {i} of {value} is not an integer"
                    ))
                })
        };

        let earth_direction = EarthDirection::parse(text(5)?)
            .ok_or_else(|| Error::invalid_response(format!("unknown direction in {value}")))?;

        let turn = if fields.len() == 9 {
            Some(Turn {
                turn_type: TurnType::parse(text(7)?)
                    .ok_or_else(|| Error::invalid_response(format!("unknown turn in {value}")))?,
                angle: number(8)?,
            })
        } else {
            None
        };

        Ok(Self {
            instruction: text(0)?.to_owned(),
            length: number(1)?,
            position: usize::try_from(integer(2)?)
                .map_err(|e| Error::invalid_response(e.to_string()))?,
            time: integer(3)?,
            length_caption: text(4)?.to_owned(),
            earth_direction,
            azimuth: number(6)?,
            turn,
        })
    }
}

/// Named point the route goes through.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitPoint {
    pub name: String,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    /// Meters.
    pub total_distance: f64,
    /// Seconds.
    pub total_time: f64,
    pub start_point: String,
    pub end_point: String,
    pub transit_points: Vec<TransitPoint>,
}

#[derive(Deserialize)]
struct RawSummary {
    total_distance: f64,
    total_time: f64,
    start_point: String,
    end_point: String,
    #[serde(default)]
    transit_points: Vec<(String, f64, f64)>,
}

impl From<RawSummary> for RouteSummary {
    fn from(raw: RawSummary) -> Self {
        Self {
            total_distance: raw.total_distance,
            total_time: raw.total_time,
            start_point: raw.start_point,
            end_point: raw.end_point,
            transit_points: raw
                .transit_points
                .into_iter()
                .map(|(name, lat, lon)| TransitPoint {
                    name,
                    point: lat_lon(lat, lon),
                })
                .collect(),
        }
    }
}

/// Route found by [`RoutingService::route`].
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub status: i64,
    pub status_message: Option<String>,
    pub version: String,
    pub instructions: Vec<RouteInstruction>,
    pub summary: RouteSummary,
    pub geometry: Line,
}

#[derive(Deserialize)]
struct RawRoute {
    #[serde(default)]
    status: i64,
    status_message: Option<String>,
    version: Option<String>,
    route_instructions: Option<Vec<Value>>,
    route_summary: Option<RawSummary>,
    route_geometry: Option<Value>,
}

impl Route {
    pub fn from_json(value: Value) -> Result<Self> {
        let raw: RawRoute = serde_json::from_value(value)?;

        if raw.status != 0 {
            return Err(Error::Service {
                status: raw.status,
                message: raw.status_message.unwrap_or_default(),
            });
        }

        let (Some(instructions), Some(summary), Some(geometry)) =
            (raw.route_instructions, raw.route_summary, raw.route_geometry)
        else {
            return Err(Error::invalid_response(
                "route without instructions, summary or geometry",
            ));
        };

        Ok(Self {
            status: raw.status,
            status_message: raw.status_message,
            version: raw.version.unwrap_or_default(),
            instructions: instructions
                .iter()
                .map(RouteInstruction::from_json)
                .collect::<Result<_>>()?,
            summary: summary.into(),
            geometry: Line::from_coordinates(&geometry, CoordinateOrder::LatLon)?,
        })
    }
}

/// CloudMade's routing service.
#[derive(Debug, Clone)]
pub struct RoutingService {
    service: Service,
}

impl RoutingService {
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

    /// Find a route from `start` to `end`.
    pub async fn route(&self, start: Point, end: Point, options: &RouteOptions) -> Result<Route> {
        let request = route_request(start, end, options, "js")?;
        let route = Route::from_json(self.service.connect_json(&request).await?)?;
        log::debug!(
            "Route from {} to {} has {} instructions.",
            route.summary.start_point,
            route.summary.end_point,
            route.instructions.len()
        );
        Ok(route)
    }

    /// Same route as [`RoutingService::route`], but as a GPX document.
    pub async fn route_gpx(
        &self,
        start: Point,
        end: Point,
        options: &RouteOptions,
    ) -> Result<Bytes> {
        let request = route_request(start, end, options, "gpx")?;
        self.service.connect(&request).await
    }
}
