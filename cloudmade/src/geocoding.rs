//! Geocoding: turn a place name or a position into places with coordinates and metadata.
//! <http://developers.cloudmade.com/projects/show/geocoding-http-api>

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::geometry::{BBox, CoordinateOrder, Geometry, Point};
use crate::service::{QueryString, Service, encode};

pub const SUBDOMAIN: &str = "geocoding";

/// Search radius used when [`FindOptions::around`] is given without a distance.
pub const DEFAULT_DISTANCE: u32 = 16000;

/// Center of the search area.
#[derive(Debug, Clone, PartialEq)]
pub enum Around {
    Point(Point),
    /// Free-text address. If the query is an address too, only one of them may be.
    Address(String),
}

impl Around {
    fn to_url(&self) -> String {
        match self {
            Self::Point(point) => point.to_string(),
            Self::Address(address) => encode(address),
        }
    }
}

impl From<Point> for Around {
    fn from(point: Point) -> Self {
        Self::Point(point)
    }
}

/// Radius of the search area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    Meters(u32),
    /// Only one result, closest to the center of the search area.
    Closest,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meters(meters) => write!(f, "{meters}"),
            Self::Closest => f.write_str("closest"),
        }
    }
}

/// Filters and switches of [`GeocodingService::find`].
#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Number of results to return.
    pub results: u32,

    /// Number of results to skip from the beginning.
    pub skip: u32,

    /// Search area. Cannot be used together with [`FindOptions::around`].
    pub bbox: Option<BBox>,

    /// Used only with [`FindOptions::bbox`]. When `false`, results from the whole planet are
    /// returned too, but the ones inside the box are ranked higher.
    pub bbox_only: bool,

    /// Center of the search area. Cannot be used together with [`FindOptions::bbox`].
    pub around: Option<Around>,

    /// Used only with [`FindOptions::around`], defaults to [`DEFAULT_DISTANCE`] meters.
    pub distance: Option<Distance>,

    /// Limits results to a specific object type, e.g. `cafe` or `hotel`.
    /// <http://developers.cloudmade.com/wiki/geocoding-http-api/Object_Types>
    pub object_type: Option<String>,

    /// Include geometries in the results.
    pub return_geometry: bool,

    /// Include road, city, county, country and postcode in the results.
    pub return_location: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            results: 10,
            skip: 0,
            bbox: None,
            bbox_only: true,
            around: None,
            distance: None,
            object_type: None,
            return_geometry: true,
            return_location: false,
        }
    }
}

/// Build the request for [`GeocodingService::find`], validating the options on the way.
pub fn find_request(query: &str, options: &FindOptions) -> Result<String> {
    if query.is_empty() && options.around.is_none() && options.object_type.is_none() {
        return Err(Error::invalid_argument(
            "search needs a query, an object type or a center point",
        ));
    }

    if options.bbox.is_some() && options.around.is_some() {
        return Err(Error::invalid_argument(
            "bbox cannot be used together with around",
        ));
    }

    let mut params = QueryString::default();

    if !query.is_empty() {
        params.push_encoded("query", query);
    }

    if let Some(object_type) = &options.object_type {
        params.push_encoded("object_type", object_type);
    }

    match (&options.around, options.distance) {
        (Some(around), distance) => {
            params
                .push("around", around.to_url())
                .push("distance", distance.unwrap_or(Distance::Meters(DEFAULT_DISTANCE)));
        }
        (None, Some(_)) => {
            return Err(Error::invalid_argument("distance needs around"));
        }
        (None, None) => {}
    }

    if let Some(bbox) = options.bbox {
        params.push("bbox", bbox).push("bbox_only", options.bbox_only);
    }

    params
        .push("results", options.results)
        .push("skip", options.skip)
        .push("return_geometry", options.return_geometry)
        .push("return_location", options.return_location);

    Ok(format!("/geocoding/v2/find.js?{params}"))
}

/// Address of a found object.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Location {
    pub road: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

/// Single object found by the geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoResult {
    pub id: u64,
    pub centroid: Point,
    pub bounds: BBox,
    /// Free-form tags of the object, such as `name` or `amenity`.
    pub properties: Map<String, Value>,
    /// Present only if requested with [`FindOptions::return_location`].
    pub location: Option<Location>,
    /// Present only if requested with [`FindOptions::return_geometry`].
    pub geometry: Option<Geometry>,
}

impl GeoResult {
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoResults {
    /// Total number of found objects, which might be more than returned.
    pub found: u64,
    pub results: Vec<GeoResult>,
    /// Box containing all returned results.
    pub bounds: Option<BBox>,
}

#[derive(Deserialize)]
struct RawResults {
    #[serde(default)]
    found: u64,
    #[serde(default)]
    features: Vec<RawFeature>,
    bounds: Option<Value>,
    crs: Option<Value>,
}

#[derive(Deserialize)]
struct RawFeature {
    id: u64,
    centroid: Value,
    bounds: Value,
    #[serde(default)]
    properties: Map<String, Value>,
    location: Option<Location>,
    geometry: Option<Value>,
}

impl GeoResults {
    /// Parse the response, taking the coordinate order from its `crs` member if there is one.
    pub fn from_json(value: Value) -> Result<Self> {
        let order = value
            .get("crs")
            .and_then(CoordinateOrder::from_crs)
            .unwrap_or_default();
        Self::from_json_with_order(value, order)
    }

    /// Parse the response, reading coordinates in given order.
    pub fn from_json_with_order(value: Value, order: CoordinateOrder) -> Result<Self> {
        let raw: RawResults = serde_json::from_value(value)?;

        if let Some(crs) = &raw.crs {
            if CoordinateOrder::from_crs(crs).is_some_and(|declared| declared != order) {
                log::warn!("Response declares {crs}, but parsing as {order:?}.");
            }
        }

        let results = raw
            .features
            .into_iter()
            .map(|feature| GeoResult::from_raw(feature, order))
            .collect::<Result<Vec<_>>>()?;

        log::trace!("Parsed {} of {} found results.", results.len(), raw.found);

        Ok(Self {
            found: raw.found,
            results,
            bounds: raw
                .bounds
                .map(|bounds| BBox::from_coordinates(&bounds, order))
                .transpose()?,
        })
    }
}

impl GeoResult {
    fn from_raw(raw: RawFeature, order: CoordinateOrder) -> Result<Self> {
        let centroid = match Geometry::from_json(&raw.centroid, order)? {
            Some(Geometry::Point(point)) => point,
            other => {
                return Err(Error::invalid_response(format!(
                    "centroid of {} is not a point: {other:?}",
                    raw.id
                )));
            }
        };

        let geometry = match raw.geometry {
            Some(geometry) if !geometry.is_null() => Geometry::from_json(&geometry, order)?,
            _ => None,
        };

        Ok(Self {
            id: raw.id,
            centroid,
            bounds: BBox::from_coordinates(&raw.bounds, order)?,
            properties: raw.properties,
            location: raw.location,
            geometry,
        })
    }
}

/// CloudMade's geocoding service.
#[derive(Debug, Clone)]
pub struct GeocodingService {
    service: Service,
}

impl GeocodingService {
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

    /// Find objects matching the query, e.g. `Potsdamer Platz, Berlin, Germany` or
    /// `hotel near Potsdamer Platz, Berlin, Germany`.
    pub async fn find(&self, query: &str, options: &FindOptions) -> Result<GeoResults> {
        let request = find_request(query, options)?;
        let response = self.service.connect_json(&request).await?;
        GeoResults::from_json(response)
    }

    /// Find the object of given type, closest to the point.
    pub async fn find_closest(
        &self,
        object_type: &str,
        point: Point,
        return_geometry: bool,
        return_location: bool,
    ) -> Result<Option<GeoResult>> {
        let options = FindOptions {
            results: 1,
            around: Some(Around::Point(point)),
            distance: Some(Distance::Closest),
            object_type: Some(object_type.to_owned()),
            return_geometry,
            return_location,
            ..Default::default()
        };

        let results = self.find("", &options).await?;
        if results.results.is_empty() {
            log::debug!("No '{object_type}' found around {point}.");
        }
        Ok(results.results.into_iter().next())
    }
}
