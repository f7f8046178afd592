//! Console rendering of search results, trips and history.

use colored::Colorize;
use eld_planner_core::present::{self, weekly_hours_rows};
use eld_planner_core::{GeocodeCandidate, HistoryBook, LocationField, TripView};
use std::io::{self, Write};

pub fn candidates(out: &mut impl Write, candidates: &[GeocodeCandidate]) -> io::Result<()> {
    if candidates.is_empty() {
        writeln!(out, "{}", "No matching addresses.".yellow())?;
        return Ok(());
    }
    for (index, candidate) in candidates.iter().enumerate() {
        writeln!(out, "{:>2}. {}", index + 1, candidate.freeform_address.bold())?;
        writeln!(out, "    {}", candidate.subtitle().dimmed())?;
    }
    Ok(())
}

pub fn trip(out: &mut impl Write, view: &TripView) -> io::Result<()> {
    let result = &view.result;
    writeln!(out, "{} {}", "🚚 Trip".bright_cyan().bold(), result.trip_id.bold())?;
    if let Some(locations) = view.locations.as_ref() {
        for field in LocationField::ALL {
            writeln!(out, "   {:<17} {}", field.title(), locations.get(field).address)?;
        }
    }
    writeln!(
        out,
        "   Driver: {} • {} • Vehicle {}",
        view.driver.driver_name, view.driver.carrier_name, view.driver.vehicle_number
    )?;
    writeln!(
        out,
        "   Distance {} • Driving {} • Total {} • Rest breaks {}",
        present::miles(result.total_distance_miles),
        present::hours(result.total_driving_hours),
        present::hours(result.estimated_total_hours),
        result.summary.rest_breaks
    )?;

    let compliance = &result.hos_compliance;
    if compliance.compliant {
        writeln!(out, "✅ {}", compliance.headline().green())?;
    } else {
        writeln!(out, "❌ {}", compliance.headline().red())?;
        for violation in &compliance.violations {
            writeln!(out, "   - {violation}")?;
        }
    }

    if let Some(weekly) = result.weekly_hours.as_ref() {
        writeln!(out, "{}", "Weekly Hours".bold())?;
        for row in weekly_hours_rows(weekly) {
            let line = format!("   {:<11} {}", row.label, row.value);
            if row.warning {
                writeln!(out, "{}", line.yellow())?;
            } else {
                writeln!(out, "{line}")?;
            }
        }
    }

    writeln!(out, "{}", "Schedule".bold())?;
    for item in &result.schedule {
        let distance = present::schedule_distance(item).unwrap_or_default();
        let line = format!(
            "   {} {:<9} {:<24} {:>9} {}",
            item.start_time.clock_label(),
            item.duty_status.label(),
            item.activity,
            present::duration(item.duration_hours),
            distance
        );
        match present::split_sleeper_badge(item) {
            Some(badge) => writeln!(out, "{} {}", line.trim_end(), format!("[{badge}]").cyan())?,
            None => writeln!(out, "{}", line.trim_end())?,
        }
    }

    if !result.daily_logs.is_empty() {
        writeln!(out, "{}", "Daily Logs".bold())?;
        for day in &result.daily_logs {
            writeln!(
                out,
                "   {}: {}, driving {}, on-duty {}, off-duty {}, sleeper {}",
                day.date_label(),
                present::miles(day.total_miles),
                present::hours(day.total_driving),
                present::hours(day.total_on_duty),
                present::hours(day.total_off_duty),
                present::hours(day.total_sleeper)
            )?;
        }
    }
    Ok(())
}

pub fn history(out: &mut impl Write, book: &HistoryBook) -> io::Result<()> {
    if book.is_empty() {
        writeln!(out, "{}", "No trips yet.".yellow())?;
        return Ok(());
    }
    for record in book.records() {
        let plan = &record.trip_plan;
        let badge = if plan.hos_compliance.compliant {
            "compliant".green()
        } else {
            "violations".red()
        };
        writeln!(
            out,
            "{} [{badge}] {}",
            record.id.bold(),
            record.created_label().unwrap_or_default()
        )?;
        writeln!(
            out,
            "   {} → {} → {}",
            record.address_label(LocationField::Current),
            record.address_label(LocationField::Pickup),
            record.address_label(LocationField::Dropoff)
        )?;
        writeln!(
            out,
            "   Driver {} • {} • {} driving",
            record.driver_label(),
            present::miles(plan.total_distance_miles),
            present::hours(plan.total_driving_hours)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eld_planner_core::{Coordinate, HistoryRecord, TripView};
    use serde_json::json;

    fn plain() {
        colored::control::set_override(false);
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        plain();
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn candidates_are_numbered() {
        let list = vec![GeocodeCandidate {
            coordinate: Coordinate::new(40.0, -75.0).unwrap(),
            freeform_address: "123 Main St, Philadelphia, PA".into(),
            country: "United States".into(),
        }];
        let text = render(|out| candidates(out, &list));
        assert!(text.contains(" 1. 123 Main St, Philadelphia, PA"));
        assert!(text.contains("United States • 40.0000, -75.0000"));
        assert!(render(|out| candidates(out, &[])).contains("No matching addresses."));
    }

    #[test]
    fn history_lines_use_fallback_labels() {
        let record: HistoryRecord = serde_json::from_value(json!({
            "_id": "abc",
            "current_location": {"lat": 40.0, "lon": -75.0, "address": "Philadelphia, PA"},
            "pickup_location": {"lat": 40.71278, "lon": -74.00597},
            "dropoff_location": {"lat": 42.36, "lon": -71.06, "address": "Boston, MA"},
            "trip_plan": {
                "total_distance_miles": 310.0, "total_driving_hours": 5.6,
                "estimated_total_hours": 8.0,
                "hos_compliance": {"compliant": true},
                "schedule": [{"start_time": "2024-03-04T08:00:00", "duty_status": "driving",
                              "activity": "Driving", "duration_hours": 5.6}]
            }
        }))
        .unwrap();
        let text = render(|out| history(out, &HistoryBook::new(vec![record])));
        assert!(text.contains("abc [compliant]"));
        assert!(text.contains("Philadelphia, PA → 40.7128, -74.0060 → Boston, MA"));
        assert!(text.contains("Driver N/A • 310.0 miles • 5.6 hrs driving"));
    }

    #[test]
    fn schedule_marks_split_sleeper_segments() {
        let record: HistoryRecord = serde_json::from_value(json!({
            "_id": "split",
            "current_location": {"lat": 40.0, "lon": -75.0, "address": "Philadelphia, PA"},
            "pickup_location": {"lat": 40.7, "lon": -74.0, "address": "New York, NY"},
            "dropoff_location": {"lat": 42.36, "lon": -71.06, "address": "Boston, MA"},
            "trip_plan": {
                "total_distance_miles": 98.4, "total_driving_hours": 2.25,
                "estimated_total_hours": 9.25,
                "hos_compliance": {"compliant": true},
                "schedule": [
                    {"start_time": "2024-01-05T08:00:00", "duty_status": "driving",
                     "activity": "Driving", "duration_hours": 2.25, "distance_miles": 98.4},
                    {"start_time": "2024-01-05T10:15:00", "duty_status": "sleeper_berth",
                     "activity": "Sleeper Berth", "duration_hours": 7.0,
                     "split_sleeper_segment": 1}
                ]
            }
        }))
        .unwrap();
        let view = TripView::from_history_record(record).unwrap();
        let text = render(|out| trip(out, &view));
        let sleeper = text
            .lines()
            .find(|line| line.contains("Sleeper Berth"))
            .unwrap();
        assert!(sleeper.ends_with("[Split Sleeper 1]"));
        let driving = text.lines().find(|line| line.contains("98.4 miles")).unwrap();
        assert!(!driving.contains("Split Sleeper"));
    }
}
