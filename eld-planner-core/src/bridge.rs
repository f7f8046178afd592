//! Trip data bridge: one canonical [`TripView`] whether a plan comes from a
//! fresh submission or from a stored history record.

use crate::form::{DriverInfo, TripPlanRequest};
use crate::location::{LocationField, LocationInput, Waypoints, WireLocation};
use crate::trip::{
    DailyLog, HosCompliance, ScheduleItem, TripPlanResult, TripShapeError, TripSummary,
    WeeklyHours,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Placeholder for driver and carrier fields a history record lacks.
pub const MISSING_FIELD_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("trip plan cannot be displayed: {0}")]
    Shape(#[from] TripShapeError),
    #[error("trip view has no valid locations to store")]
    MissingLocations,
}

/// The three committed trip locations in travel order.
#[derive(Debug, Clone, PartialEq)]
pub struct TripLocations {
    pub current: LocationInput,
    pub pickup: LocationInput,
    pub dropoff: LocationInput,
}

impl TripLocations {
    fn from_wire(current: &WireLocation, pickup: &WireLocation, dropoff: &WireLocation) -> Option<Self> {
        let resolve = |field: LocationField, wire: &WireLocation| {
            LocationInput::from_wire(wire)
                .map_err(|err| log::warn!("ignoring invalid {field} location: {err}"))
                .ok()
        };
        Some(Self {
            current: resolve(LocationField::Current, current)?,
            pickup: resolve(LocationField::Pickup, pickup)?,
            dropoff: resolve(LocationField::Dropoff, dropoff)?,
        })
    }

    #[must_use]
    pub const fn get(&self, field: LocationField) -> &LocationInput {
        match field {
            LocationField::Current => &self.current,
            LocationField::Pickup => &self.pickup,
            LocationField::Dropoff => &self.dropoff,
        }
    }

    #[must_use]
    pub const fn waypoints(&self) -> Waypoints {
        Waypoints {
            current: self.current.coordinate,
            pickup: self.pickup.coordinate,
            dropoff: self.dropoff.coordinate,
        }
    }
}

/// What the results view and map pipeline consume.
#[derive(Debug, Clone, PartialEq)]
pub struct TripView {
    pub result: TripPlanResult,
    pub locations: Option<TripLocations>,
    pub driver: DriverInfo,
    pub current_cycle_used: f64,
}

impl TripView {
    /// Pair a planner response with the request that produced it. The result
    /// passes through unchanged; a schedule that is empty or out of order is
    /// only logged, since the service accepted the request.
    #[must_use]
    pub fn from_submission(request: &TripPlanRequest, result: TripPlanResult) -> Self {
        if let Err(err) = result.validate() {
            log::warn!("trip {} has an irregular schedule: {err}", result.trip_id);
        }
        Self {
            locations: TripLocations::from_wire(
                &request.current_location,
                &request.pickup_location,
                &request.dropoff_location,
            ),
            driver: request.driver.clone(),
            current_cycle_used: request.current_cycle_used,
            result,
        }
    }

    /// Rebuild a view from a persisted record, defaulting what it lacks.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Shape`] when the stored schedule is empty or unordered.
    pub fn from_history_record(record: HistoryRecord) -> Result<Self, BridgeError> {
        let locations = TripLocations::from_wire(
            &record.current_location,
            &record.pickup_location,
            &record.dropoff_location,
        );
        let driver = record.driver_info.unwrap_or_default().with_placeholders();
        let result = record.trip_plan.into_result(record.id);
        result.validate()?;
        Ok(Self {
            result,
            locations,
            driver,
            current_cycle_used: record.current_cycle_used.unwrap_or(0.0),
        })
    }

    #[must_use]
    pub fn waypoints(&self) -> Option<Waypoints> {
        self.locations.as_ref().map(TripLocations::waypoints)
    }
}

/// Driver fields as stored; any of them may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredDriverInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_office: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
}

impl StoredDriverInfo {
    #[must_use]
    pub fn with_placeholders(self) -> DriverInfo {
        let or_placeholder = |value: Option<String>| {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string())
        };
        DriverInfo {
            driver_name: or_placeholder(self.driver_name),
            carrier_name: or_placeholder(self.carrier_name),
            main_office: or_placeholder(self.main_office),
            vehicle_number: or_placeholder(self.vehicle_number),
        }
    }
}

impl From<&DriverInfo> for StoredDriverInfo {
    fn from(driver: &DriverInfo) -> Self {
        Self {
            driver_name: Some(driver.driver_name.clone()),
            carrier_name: Some(driver.carrier_name.clone()),
            main_office: Some(driver.main_office.clone()),
            vehicle_number: Some(driver.vehicle_number.clone()),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// A [`TripPlanResult`] as nested inside a history record (id lives on the record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTripPlan {
    pub total_distance_miles: f64,
    pub total_driving_hours: f64,
    pub estimated_total_hours: f64,
    pub hos_compliance: HosCompliance,
    pub schedule: Vec<ScheduleItem>,
    #[serde(default)]
    pub daily_logs: Vec<DailyLog>,
    #[serde(default)]
    pub summary: TripSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_hours: Option<WeeklyHours>,
    #[serde(default = "empty_object")]
    pub route_data: Value,
}

impl StoredTripPlan {
    #[must_use]
    pub fn into_result(self, trip_id: String) -> TripPlanResult {
        TripPlanResult {
            trip_id,
            total_distance_miles: self.total_distance_miles,
            total_driving_hours: self.total_driving_hours,
            estimated_total_hours: self.estimated_total_hours,
            hos_compliance: self.hos_compliance,
            schedule: self.schedule,
            daily_logs: self.daily_logs,
            summary: self.summary,
            weekly_hours: self.weekly_hours,
            route_data: self.route_data,
        }
    }
}

impl From<&TripPlanResult> for StoredTripPlan {
    fn from(result: &TripPlanResult) -> Self {
        Self {
            total_distance_miles: result.total_distance_miles,
            total_driving_hours: result.total_driving_hours,
            estimated_total_hours: result.estimated_total_hours,
            hos_compliance: result.hos_compliance.clone(),
            schedule: result.schedule.clone(),
            daily_logs: result.daily_logs.clone(),
            summary: result.summary.clone(),
            weekly_hours: result.weekly_hours.clone(),
            route_data: result.route_data.clone(),
        }
    }
}

/// A persisted trip as returned by `GET /trips/list/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub current_location: WireLocation,
    pub pickup_location: WireLocation,
    pub dropoff_location: WireLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_info: Option<StoredDriverInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_cycle_used: Option<f64>,
    pub trip_plan: StoredTripPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl HistoryRecord {
    /// The record the planning service would persist for a displayed view.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingLocations`] when the view has no locations.
    pub fn from_view(view: &TripView, created_at: Option<String>) -> Result<Self, BridgeError> {
        let locations = view.locations.as_ref().ok_or(BridgeError::MissingLocations)?;
        Ok(Self {
            id: view.result.trip_id.clone(),
            current_location: locations.current.to_wire(),
            pickup_location: locations.pickup.to_wire(),
            dropoff_location: locations.dropoff.to_wire(),
            driver_info: Some(StoredDriverInfo::from(&view.driver)),
            current_cycle_used: Some(view.current_cycle_used),
            trip_plan: StoredTripPlan::from(&view.result),
            created_at,
        })
    }

    /// Address shown on a history card; `lat, lon` to four places when missing.
    #[must_use]
    pub fn address_label(&self, field: LocationField) -> String {
        let wire = match field {
            LocationField::Current => &self.current_location,
            LocationField::Pickup => &self.pickup_location,
            LocationField::Dropoff => &self.dropoff_location,
        };
        wire.address
            .as_deref()
            .filter(|a| !a.is_empty())
            .map_or_else(|| format!("{:.4}, {:.4}", wire.lat, wire.lon), str::to_string)
    }

    #[must_use]
    pub fn driver_label(&self) -> String {
        self.driver_info
            .as_ref()
            .and_then(|info| info.driver_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string())
    }

    /// `January 5, 2024, 03:30 PM`, or the raw value when unparseable.
    #[must_use]
    pub fn created_label(&self) -> Option<String> {
        let raw = self.created_at.as_deref()?;
        let stamp = crate::trip::Timestamp::new(raw);
        Some(stamp.wall_clock().map_or_else(
            || raw.to_string(),
            |t| t.format("%B %-d, %Y, %I:%M %p").to_string(),
        ))
    }
}

/// Body of `GET /trips/list/`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripList {
    #[serde(default)]
    pub trips: Vec<HistoryRecord>,
}
