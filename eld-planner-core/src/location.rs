//! Trip locations: the three form fields, geocoder candidates and the
//! committed inputs they resolve to.

use crate::geo::{Coordinate, CoordinateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three location fields of the trip form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationField {
    Current,
    Pickup,
    Dropoff,
}

impl LocationField {
    pub const ALL: [Self; 3] = [Self::Current, Self::Pickup, Self::Dropoff];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Pickup => 1,
            Self::Dropoff => 2,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Pickup => "pickup",
            Self::Dropoff => "dropoff",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Current => "Current Location",
            Self::Pickup => "Pickup Location",
            Self::Dropoff => "Dropoff Location",
        }
    }
}

impl fmt::Display for LocationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A ranked geocoder result. Ephemeral: superseded by the next search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub coordinate: Coordinate,
    pub freeform_address: String,
    #[serde(default)]
    pub country: String,
}

impl GeocodeCandidate {
    /// `United States • 40.0000, -75.0000`
    #[must_use]
    pub fn subtitle(&self) -> String {
        format!(
            "{} • {:.4}, {:.4}",
            self.country,
            self.coordinate.lat(),
            self.coordinate.lon()
        )
    }
}

/// A committed location for one form field. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    pub coordinate: Coordinate,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_candidate: Option<GeocodeCandidate>,
}

impl LocationInput {
    #[must_use]
    pub fn new(coordinate: Coordinate, address: impl Into<String>) -> Self {
        Self {
            coordinate,
            address: address.into(),
            raw_candidate: None,
        }
    }

    #[must_use]
    pub fn from_candidate(candidate: &GeocodeCandidate) -> Self {
        Self {
            coordinate: candidate.coordinate,
            address: candidate.freeform_address.clone(),
            raw_candidate: Some(candidate.clone()),
        }
    }

    /// Accept a typed `"lat, lon"` pair without going through the geocoder.
    ///
    /// # Errors
    ///
    /// Returns a [`CoordinateError`] when the text is not a valid pair.
    pub fn from_typed_coordinates(text: &str) -> Result<Self, CoordinateError> {
        let coordinate = Coordinate::parse_pair(text)?;
        Ok(Self::new(coordinate, text.trim()))
    }

    /// Build from a wire location, falling back to `"lat, lon"` for a missing address.
    ///
    /// # Errors
    ///
    /// Returns a [`CoordinateError`] when the stored coordinates are out of range.
    pub fn from_wire(wire: &WireLocation) -> Result<Self, CoordinateError> {
        let coordinate = Coordinate::new(wire.lat, wire.lon)?;
        let address = wire
            .address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .map_or_else(|| coordinate.to_string(), str::to_string);
        Ok(Self::new(coordinate, address))
    }

    #[must_use]
    pub fn to_wire(&self) -> WireLocation {
        WireLocation {
            lat: self.coordinate.lat(),
            lon: self.coordinate.lon(),
            address: Some(self.address.clone()),
        }
    }
}

/// `{lat, lon, address?}` as exchanged with the planning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLocation {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// The three trip waypoints in travel order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoints {
    pub current: Coordinate,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
}

impl Waypoints {
    #[must_use]
    pub const fn in_order(&self) -> [Coordinate; 3] {
        [self.current, self.pickup, self.dropoff]
    }

    #[must_use]
    pub const fn get(&self, field: LocationField) -> Coordinate {
        match field {
            LocationField::Current => self.current,
            LocationField::Pickup => self.pickup,
            LocationField::Dropoff => self.dropoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_and_labels() {
        let keys: Vec<_> = LocationField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys, ["current", "pickup", "dropoff"]);
        assert_eq!(LocationField::Dropoff.index(), 2);
        assert_eq!(LocationField::Pickup.title(), "Pickup Location");
    }

    #[test]
    fn wire_location_without_address_uses_coordinates() {
        let wire = WireLocation {
            lat: 40.5,
            lon: -75.0,
            address: None,
        };
        let input = LocationInput::from_wire(&wire).unwrap();
        assert_eq!(input.address, "40.5, -75");

        let blank = WireLocation {
            address: Some("  ".into()),
            ..wire
        };
        assert_eq!(LocationInput::from_wire(&blank).unwrap().address, "40.5, -75");
    }

    #[test]
    fn typed_coordinates_keep_the_typed_text() {
        let input = LocationInput::from_typed_coordinates("41.0, -74.0 ").unwrap();
        assert_eq!(input.address, "41.0, -74.0");
        assert!(input.raw_candidate.is_none());
        assert!(LocationInput::from_typed_coordinates("Chicago").is_err());
    }

    #[test]
    fn candidate_subtitle_formats_four_decimals() {
        let candidate = GeocodeCandidate {
            coordinate: Coordinate::new(40.0, -75.12346).unwrap(),
            freeform_address: "123 Main St".into(),
            country: "United States".into(),
        };
        assert_eq!(candidate.subtitle(), "United States • 40.0000, -75.1235");
    }
}
