//! Canonical trip plan returned by the planning service.
//!
//! Field names follow the service's snake_case wire format so a plan that
//! arrives from a fresh submission and one rebuilt from a history record
//! serialize identically.

use crate::geo::Coordinate;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Activity label the service uses for refuelling stops.
pub const FUELING_STOP: &str = "Fueling Stop";

/// Hours-of-service category of a schedule segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    Driving,
    OnDuty,
    OffDuty,
    SleeperBerth,
}

impl DutyStatus {
    /// Order of the four rows on a daily log grid.
    pub const ALL: [Self; 4] = [Self::OffDuty, Self::SleeperBerth, Self::Driving, Self::OnDuty];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Driving => "Driving",
            Self::OnDuty => "On-Duty",
            Self::OffDuty => "Off-Duty",
            Self::SleeperBerth => "Sleeper",
        }
    }

    /// Wire name, also used as a CSS modifier.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::OnDuty => "on_duty",
            Self::OffDuty => "off_duty",
            Self::SleeperBerth => "sleeper_berth",
        }
    }
}

/// Timestamp as sent by the service, kept verbatim so it round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wall-clock time of the timestamp, accepting RFC 3339 and naive ISO forms.
    #[must_use]
    pub fn wall_clock(&self) -> Option<NaiveDateTime> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(parsed.naive_local());
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&self.0, fmt).ok())
    }

    /// Absolute instant used for ordering; naive timestamps are read as UTC.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(parsed.with_timezone(&Utc));
        }
        self.wall_clock().map(|naive| naive.and_utc())
    }

    /// `08:30 AM` style label used by the schedule list.
    #[must_use]
    pub fn clock_label(&self) -> String {
        self.wall_clock().map_or_else(
            || self.0.clone(),
            |time| time.format("%I:%M %p").to_string(),
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl LocationInfo {
    /// `City, ST` when both parts are known, otherwise whatever is available.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => format!("{city}, {state}"),
            (_, Some(state)) => state.clone(),
            _ => "Location available".to_string(),
        }
    }
}

/// One segment of the planned duty schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub start_time: Timestamp,
    pub duty_status: DutyStatus,
    pub activity: String,
    #[serde(default)]
    pub description: String,
    pub duration_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(
        default,
        deserialize_with = "crate::geo::lenient_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_info: Option<LocationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_sleeper_segment: Option<u32>,
}

impl ScheduleItem {
    /// Sleeper-berth rests and fueling stops are drawn on the map.
    #[must_use]
    pub fn is_overlay_candidate(&self) -> bool {
        self.duty_status == DutyStatus::SleeperBerth || self.activity == FUELING_STOP
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub total_miles: f64,
    pub total_driving: f64,
    pub total_on_duty: f64,
    pub total_off_duty: f64,
    pub total_sleeper: f64,
}

impl DailyLog {
    /// `Monday, January 1, 2024`
    #[must_use]
    pub fn date_label(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }

    #[must_use]
    pub fn hours_for(&self, status: DutyStatus) -> f64 {
        match status {
            DutyStatus::Driving => self.total_driving,
            DutyStatus::OnDuty => self.total_on_duty,
            DutyStatus::OffDuty => self.total_off_duty,
            DutyStatus::SleeperBerth => self.total_sleeper,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HosCompliance {
    pub compliant: bool,
    #[serde(default)]
    pub violations: Vec<String>,
}

impl HosCompliance {
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        if self.compliant {
            "Trip is compliant with HOS regulations"
        } else {
            "HOS violations detected"
        }
    }
}

/// Summary counters; keys this client does not interpret are preserved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripSummary {
    #[serde(default)]
    pub rest_breaks: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub mode: String,
    pub hours_used: f64,
    pub hours_remaining: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_after_trip: Option<f64>,
}

impl WeeklyHours {
    pub const LOW_REMAINING_HOURS: f64 = 5.0;

    #[must_use]
    pub fn after_trip_is_low(&self) -> bool {
        self.hours_after_trip
            .is_some_and(|hours| hours < Self::LOW_REMAINING_HOURS)
    }
}

/// Shape violations that make a plan unrenderable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TripShapeError {
    #[error("trip plan has an empty schedule")]
    EmptySchedule,
    #[error("schedule item {index} starts before the item preceding it")]
    OutOfOrder { index: usize },
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// The canonical, read-only plan consumed by the map and result views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlanResult {
    pub trip_id: String,
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

impl TripPlanResult {
    /// Check the schedule is non-empty and time-ordered.
    ///
    /// Items whose timestamps cannot be parsed are not compared.
    ///
    /// # Errors
    ///
    /// Returns [`TripShapeError`] describing the first violation found.
    pub fn validate(&self) -> Result<(), TripShapeError> {
        if self.schedule.is_empty() {
            return Err(TripShapeError::EmptySchedule);
        }
        let mut previous = None;
        for (index, item) in self.schedule.iter().enumerate() {
            let Some(instant) = item.start_time.instant() else {
                continue;
            };
            if previous.is_some_and(|prev| instant < prev) {
                return Err(TripShapeError::OutOfOrder { index });
            }
            previous = Some(instant);
        }
        Ok(())
    }

    /// Schedule items that should be drawn as stop markers.
    pub fn overlay_stops(&self) -> impl Iterator<Item = &ScheduleItem> {
        self.schedule
            .iter()
            .filter(|item| item.is_overlay_candidate())
    }
}
