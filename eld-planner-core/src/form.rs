//! Trip form session and the plan request it produces.

use crate::location::{LocationField, LocationInput, WireLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upper bound of the weekly duty cycle the form accepts.
pub const MAX_CYCLE_HOURS: f64 = 70.0;

/// Weekly on-duty limit the carrier operates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeeklyMode {
    /// 70 hours in 8 days.
    #[default]
    #[serde(rename = "70/8")]
    SeventyEight,
    /// 60 hours in 7 days.
    #[serde(rename = "60/7")]
    SixtySeven,
}

impl WeeklyMode {
    pub const ALL: [Self; 2] = [Self::SeventyEight, Self::SixtySeven];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SeventyEight => "70/8",
            Self::SixtySeven => "60/7",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SeventyEight => "70 hours in 8 days (Standard)",
            Self::SixtySeven => "60 hours in 7 days",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.code() == code)
    }
}

impl fmt::Display for WeeklyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Optional hours-of-service rules sent with a plan request.
///
/// Defaults: 70/8 weekly mode, every exception off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HosOptions {
    #[serde(default)]
    pub weekly_mode: WeeklyMode,
    /// Split the 10-hour rest into 7+3 or 8+2 sleeper periods.
    #[serde(default)]
    pub use_split_sleeper: bool,
    /// Allow two extra driving hours for adverse conditions.
    #[serde(default)]
    pub use_adverse_conditions: bool,
    /// 150 air-mile short-haul exception.
    #[serde(default)]
    pub use_air_mile_exception: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_name: String,
    pub carrier_name: String,
    pub main_office: String,
    pub vehicle_number: String,
}

/// Body of `POST /trips/plan/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlanRequest {
    pub current_location: WireLocation,
    pub pickup_location: WireLocation,
    pub dropoff_location: WireLocation,
    pub current_cycle_used: f64,
    #[serde(flatten)]
    pub driver: DriverInfo,
    #[serde(flatten)]
    pub hos: HosOptions,
}

impl TripPlanRequest {
    #[must_use]
    pub const fn location(&self, field: LocationField) -> &WireLocation {
        match field {
            LocationField::Current => &self.current_location,
            LocationField::Pickup => &self.pickup_location,
            LocationField::Dropoff => &self.dropoff_location,
        }
    }
}

/// Input problems caught before anything is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("choose a {0} location from the suggestions or type \"lat, lon\"")]
    MissingLocation(LocationField),
    #[error("current cycle used must be a number between 0 and 70 hours (got {0:?})")]
    InvalidCycleHours(String),
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Everything the user has entered on the trip form.
///
/// Submitting borrows the form, so a failed submission leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripForm {
    locations: [Option<LocationInput>; 3],
    pub cycle_used: String,
    pub driver: DriverInfo,
    pub hos: HosOptions,
}

impl TripForm {
    #[must_use]
    pub fn location(&self, field: LocationField) -> Option<&LocationInput> {
        self.locations[field.index()].as_ref()
    }

    /// Replace the field's location wholesale.
    pub fn set_location(&mut self, field: LocationField, input: LocationInput) {
        self.locations[field.index()] = Some(input);
    }

    pub fn clear_location(&mut self, field: LocationField) {
        self.locations[field.index()] = None;
    }

    /// Fill any unset location from typed `"lat, lon"` text.
    ///
    /// Returns `true` when the typed text was accepted.
    pub fn accept_typed_location(&mut self, field: LocationField, typed: &str) -> bool {
        if self.location(field).is_some() {
            return false;
        }
        match LocationInput::from_typed_coordinates(typed) {
            Ok(input) => {
                self.set_location(field, input);
                true
            }
            Err(_) => false,
        }
    }

    /// Build the wire request.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found, checking locations in travel
    /// order, then cycle hours, then the driver/carrier fields.
    pub fn to_request(&self) -> Result<TripPlanRequest, FormError> {
        let wire = |field: LocationField| {
            self.location(field)
                .map(LocationInput::to_wire)
                .ok_or(FormError::MissingLocation(field))
        };
        let current_location = wire(LocationField::Current)?;
        let pickup_location = wire(LocationField::Pickup)?;
        let dropoff_location = wire(LocationField::Dropoff)?;

        let cycle_text = self.cycle_used.trim();
        let current_cycle_used = cycle_text
            .parse::<f64>()
            .ok()
            .filter(|hours| hours.is_finite() && (0.0..=MAX_CYCLE_HOURS).contains(hours))
            .ok_or_else(|| FormError::InvalidCycleHours(self.cycle_used.clone()))?;

        let required = [
            ("driver name", &self.driver.driver_name),
            ("carrier name", &self.driver.carrier_name),
            ("vehicle number", &self.driver.vehicle_number),
            ("main office", &self.driver.main_office),
        ];
        if let Some(&(label, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(FormError::MissingField(label));
        }

        Ok(TripPlanRequest {
            current_location,
            pickup_location,
            dropoff_location,
            current_cycle_used,
            driver: self.driver.clone(),
            hos: self.hos,
        })
    }
}
