use crate::app::services::SharedServices;
use crate::components::map_view::MapView;
use crate::dom;
use eld_planner_core::present::{self, PanelRow};
use eld_planner_core::{
    DailyLog, DutyStatus, HosCompliance, LocationField, PlannerOperation, ScheduleItem, TripView,
    pdf_file_name,
};
use std::rc::Rc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ResultsPageProps {
    pub services: SharedServices,
    #[prop_or_default]
    pub view: Option<Rc<TripView>>,
    pub on_new_trip: Callback<()>,
    pub on_history: Callback<()>,
}

fn summary_card(label: &'static str, value: String) -> Html {
    html! {
        <div class="summary-card">
            <span class="summary-label">{ label }</span>
            <span class="summary-value">{ value }</span>
        </div>
    }
}

fn compliance_banner(compliance: &HosCompliance) -> Html {
    let class = if compliance.compliant {
        "compliance compliant"
    } else {
        "compliance violation"
    };
    html! {
        <div {class} role="status">
            <strong>{ compliance.headline() }</strong>
            if !compliance.violations.is_empty() {
                <ul class="violations">
                    { for compliance.violations.iter().map(|v| html! { <li>{ v.clone() }</li> }) }
                </ul>
            }
        </div>
    }
}

fn panel_row(row: PanelRow) -> Html {
    let class = if row.warning { "panel-row warning" } else { "panel-row" };
    html! {
        <div {class}>
            <span>{ row.label }</span>
            <span>{ row.value }</span>
        </div>
    }
}

fn schedule_row(item: &ScheduleItem) -> Html {
    let class = format!("schedule-item status-{}", item.duty_status.key());
    let place = item.location_info.as_ref().map(|info| info.label());
    html! {
        <li {class}>
            <span class="schedule-time">{ item.start_time.clock_label() }</span>
            <span class="schedule-status">{ item.duty_status.label() }</span>
            <span class="schedule-activity">{ item.activity.clone() }</span>
            if !item.description.is_empty() {
                <span class="schedule-description">{ item.description.clone() }</span>
            }
            <span class="schedule-duration">{ present::duration(item.duration_hours) }</span>
            if let Some(badge) = present::split_sleeper_badge(item) {
                <span class="split-sleeper-badge">{ badge }</span>
            }
            if let Some(distance) = present::schedule_distance(item) {
                <span class="schedule-distance">{ distance }</span>
            }
            if let Some(place) = place.filter(|label| !label.is_empty()) {
                <span class="schedule-place">{ place }</span>
            }
        </li>
    }
}

fn daily_log_card(day: &DailyLog) -> Html {
    html! {
        <article class="daily-log">
            <h3>{ day.date_label() }</h3>
            <p class="daily-miles">{ present::miles(day.total_miles) }</p>
            <dl>
                { for DutyStatus::ALL.into_iter().map(|status| html! {
                    <>
                        <dt class={format!("status-{}", status.key())}>{ status.label() }</dt>
                        <dd>{ present::hours(day.hours_for(status)) }</dd>
                    </>
                }) }
            </dl>
        </article>
    }
}

#[function_component(ResultsPage)]
pub fn results_page(props: &ResultsPageProps) -> Html {
    let downloading = use_state(|| false);
    let pdf_error = use_state(|| None::<String>);

    {
        let missing = props.view.is_none();
        let on_new_trip = props.on_new_trip.clone();
        use_effect_with(missing, move |missing| {
            if *missing {
                log::info!("no trip to show; returning to the planner form");
                on_new_trip.emit(());
            }
        });
    }

    let Some(view) = props.view.clone() else {
        return html! {
            <section class="panel results-page empty">
                <p>{ "No trip planned yet." }</p>
            </section>
        };
    };
    let result = &view.result;

    let on_download = {
        let services = props.services.clone();
        let downloading = downloading.clone();
        let pdf_error = pdf_error.clone();
        let trip_id = result.trip_id.clone();
        Callback::from(move |_| {
            if *downloading {
                return;
            }
            downloading.set(true);
            pdf_error.set(None);
            let services = services.clone();
            let downloading = downloading.clone();
            let pdf_error = pdf_error.clone();
            let trip_id = trip_id.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match services.planner.download_eld_pdf(&trip_id).await {
                    Ok(bytes) => {
                        let date = dom::today().unwrap_or_default();
                        let name = pdf_file_name(&trip_id, date);
                        if let Err(err) = dom::save_file(&bytes, &name, "application/pdf") {
                            let message = dom::js_error_message(&err);
                            log::error!("saving {name} failed: {message}");
                            pdf_error.set(Some(
                                PlannerOperation::DownloadPdf.fallback_message().into(),
                            ));
                        }
                    }
                    Err(err) => {
                        log::error!("PDF download failed: {err}");
                        pdf_error.set(Some(err.user_message(PlannerOperation::DownloadPdf)));
                    }
                }
                downloading.set(false);
            });
        })
    };
    let on_new_trip = {
        let cb = props.on_new_trip.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let on_history = {
        let cb = props.on_history.clone();
        Callback::from(move |_| cb.emit(()))
    };

    let route_line = view.locations.as_ref().map(|locations| {
        LocationField::ALL
            .iter()
            .map(|&field| locations.get(field).address.clone())
            .collect::<Vec<_>>()
            .join(" → ")
    });
    let rest_breaks = result.summary.rest_breaks;

    html! {
        <section class="panel results-page">
            <header class="page-header">
                <h1>{ "Trip Plan" }</h1>
                if let Some(line) = route_line {
                    <p class="route-line">{ line }</p>
                }
                <p class="driver-line">
                    { format!("{} • {} • Vehicle {}",
                        view.driver.driver_name, view.driver.carrier_name, view.driver.vehicle_number) }
                </p>
                <div class="actions">
                    <button type="button" class="btn-secondary" onclick={on_new_trip}>{ "New Trip" }</button>
                    <button type="button" class="btn-secondary" onclick={on_history}>{ "Trip History" }</button>
                    <button type="button" class="btn-primary" onclick={on_download} disabled={*downloading}>
                        { if *downloading { "Generating PDF..." } else { "Download ELD Logs (PDF)" } }
                    </button>
                </div>
                if let Some(message) = (*pdf_error).clone() {
                    <div class="error-message" role="alert">{ message }</div>
                }
            </header>

            <div class="summary-grid">
                { summary_card("Total Distance", present::miles(result.total_distance_miles)) }
                { summary_card("Driving Time", present::hours(result.total_driving_hours)) }
                { summary_card("Total Trip Time", present::hours(result.estimated_total_hours)) }
                { summary_card("Rest Breaks", rest_breaks.to_string()) }
            </div>

            { compliance_banner(&result.hos_compliance) }

            if let Some(weekly) = result.weekly_hours.as_ref() {
                <section class="weekly-hours">
                    <h2>{ "Weekly Hours" }</h2>
                    { for present::weekly_hours_rows(weekly).into_iter().map(panel_row) }
                </section>
            }

            <MapView services={props.services.clone()} view={view.clone()} />

            <section class="schedule">
                <h2>{ "Schedule" }</h2>
                <ol>{ for result.schedule.iter().map(schedule_row) }</ol>
            </section>

            <section class="daily-logs">
                <h2>{ "Daily Logs" }</h2>
                { for result.daily_logs.iter().map(daily_log_card) }
            </section>
        </section>
    }
}
