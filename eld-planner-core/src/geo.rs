//! Geographic primitives shared by search, map and overlay code.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

static COORDINATE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?\d{1,3}(?:\.\d+)?)\s*,\s*([-+]?\d{1,3}(?:\.\d+)?)\s*$")
        .unwrap_or_else(|err| panic!("coordinate pattern must compile: {err}"))
});

/// Errors raised when a latitude/longitude pair is out of range or unreadable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("latitude must be between -90 and 90 (got {0})")]
    Latitude(f64),
    #[error("longitude must be between -180 and 180 (got {0})")]
    Longitude(f64),
    #[error("expected \"lat, lon\" but got {0:?}")]
    Unparseable(String),
}

/// A validated WGS84 position. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::Latitude`] or [`CoordinateError::Longitude`]
    /// when a component falls outside its valid range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Parse a typed `"lat, lon"` pair such as `"40.7128, -74.0060"`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError::Unparseable`] when the text is not a pair of
    /// decimal numbers, or a range error when either component is invalid.
    pub fn parse_pair(text: &str) -> Result<Self, CoordinateError> {
        let captures = COORDINATE_PAIR
            .captures(text)
            .ok_or_else(|| CoordinateError::Unparseable(text.to_string()))?;
        let lat = captures[1]
            .parse::<f64>()
            .map_err(|_| CoordinateError::Unparseable(text.to_string()))?;
        let lon = captures[2]
            .parse::<f64>()
            .map_err(|_| CoordinateError::Unparseable(text.to_string()))?;
        Self::new(lat, lon)
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// GeoJSON / atlas position order: `[lon, lat]`.
    #[must_use]
    pub const fn position(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// `deserialize_with` helper for optional positions that are informational only:
/// an out-of-range pair becomes `None` instead of failing the enclosing payload.
///
/// # Errors
///
/// Only when the value is not shaped like `{lat, lon}` at all.
pub fn lenient_optional<'de, D>(deserializer: D) -> Result<Option<Coordinate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawCoordinate>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        Coordinate::try_from(raw)
            .map_err(|err| log::warn!("dropping invalid location: {err}"))
            .ok()
    }))
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

/// Axis-aligned bounding region in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Smallest box containing every coordinate, or `None` for an empty input.
    #[must_use]
    pub fn enclosing<'a, I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = coordinates.into_iter();
        let first = iter.next()?;
        let seed = Self {
            west: first.lon,
            south: first.lat,
            east: first.lon,
            north: first.lat,
        };
        Some(iter.fold(seed, |bbox, c| Self {
            west: bbox.west.min(c.lon),
            south: bbox.south.min(c.lat),
            east: bbox.east.max(c.lon),
            north: bbox.north.max(c.lat),
        }))
    }

    /// `[west, south, east, north]`, the order the atlas SDK expects.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    #[must_use]
    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.south..=self.north).contains(&c.lat) && (self.west..=self.east).contains(&c.lon)
    }
}
