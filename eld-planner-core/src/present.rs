//! Display formatting shared by the browser views and the CLI.

use crate::trip::{ScheduleItem, WeeklyHours};

/// `9.5 hrs`
#[must_use]
pub fn hours(value: f64) -> String {
    format!("{value:.1} hrs")
}

/// `0.50 hrs`, the schedule list's finer resolution.
#[must_use]
pub fn duration(value: f64) -> String {
    format!("{value:.2} hrs")
}

/// `512.4 miles`
#[must_use]
pub fn miles(value: f64) -> String {
    format!("{value:.1} miles")
}

/// Distance label for a schedule row, if the segment covers any distance.
#[must_use]
pub fn schedule_distance(item: &ScheduleItem) -> Option<String> {
    item.distance_miles
        .filter(|distance| *distance > 0.0)
        .map(miles)
}

/// `Split Sleeper 1` for the numbered halves of a split sleeper-berth rest.
#[must_use]
pub fn split_sleeper_badge(item: &ScheduleItem) -> Option<String> {
    item.split_sleeper_segment
        .filter(|segment| *segment > 0)
        .map(|segment| format!("Split Sleeper {segment}"))
}

/// One row of the weekly-hours panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub label: &'static str,
    pub value: String,
    pub warning: bool,
}

#[must_use]
pub fn weekly_hours_rows(weekly: &WeeklyHours) -> Vec<PanelRow> {
    let mut rows = vec![
        PanelRow {
            label: "Mode",
            value: weekly.mode.clone(),
            warning: false,
        },
        PanelRow {
            label: "Hours Used",
            value: format!("{:.1} hours", weekly.hours_used),
            warning: false,
        },
        PanelRow {
            label: "Remaining",
            value: format!("{:.1} hours", weekly.hours_remaining),
            warning: false,
        },
    ];
    if let Some(after) = weekly.hours_after_trip {
        rows.push(PanelRow {
            label: "After Trip",
            value: format!("{after:.1} hours"),
            warning: weekly.after_trip_is_low(),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_labels_round_like_the_views() {
        assert_eq!(hours(9.54), "9.5 hrs");
        assert_eq!(duration(0.5), "0.50 hrs");
        assert_eq!(miles(512.44), "512.4 miles");
    }

    #[test]
    fn split_sleeper_badge_only_for_numbered_segments() {
        let mut item: ScheduleItem = serde_json::from_value(serde_json::json!({
            "start_time": "2024-01-05T19:00:00", "duty_status": "sleeper_berth",
            "activity": "Sleeper Berth", "duration_hours": 7.0, "split_sleeper_segment": 2
        }))
        .unwrap();
        assert_eq!(split_sleeper_badge(&item).as_deref(), Some("Split Sleeper 2"));
        item.split_sleeper_segment = Some(0);
        assert_eq!(split_sleeper_badge(&item), None);
        item.split_sleeper_segment = None;
        assert_eq!(split_sleeper_badge(&item), None);
    }

    #[test]
    fn after_trip_row_flags_low_remaining_hours() {
        let weekly = WeeklyHours {
            mode: "60/7".into(),
            hours_used: 50.0,
            hours_remaining: 10.0,
            hours_after_trip: Some(3.3),
        };
        let rows = weekly_hours_rows(&weekly);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].value, "3.3 hours");
        assert!(rows[3].warning);
        assert!(!rows[2].warning);
    }
}
