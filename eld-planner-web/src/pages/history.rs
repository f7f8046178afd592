use crate::app::services::SharedServices;
use crate::dom;
use eld_planner_core::present;
use eld_planner_core::{HistoryBook, HistoryRecord, LocationField, PlannerOperation, TripView};
use yew::prelude::*;

const OPEN_FAILED: &str = "This trip could not be opened.";

#[derive(Properties, PartialEq)]
pub struct HistoryListProps {
    pub book: HistoryBook,
    pub on_view: Callback<String>,
    pub on_delete: Callback<String>,
    #[prop_or_default]
    pub busy: bool,
}

fn trip_card(record: &HistoryRecord, props: &HistoryListProps) -> Html {
    let plan = &record.trip_plan;
    let on_view = {
        let cb = props.on_view.clone();
        let id = record.id.clone();
        Callback::from(move |_| cb.emit(id.clone()))
    };
    let on_delete = {
        let cb = props.on_delete.clone();
        let id = record.id.clone();
        Callback::from(move |_| cb.emit(id.clone()))
    };
    let badge = if plan.hos_compliance.compliant {
        html! { <span class="badge compliant">{ "Compliant" }</span> }
    } else {
        html! { <span class="badge violation">{ "Violations" }</span> }
    };

    html! {
        <article class="trip-card" data-trip-id={record.id.clone()}>
            <header>
                if let Some(created) = record.created_label() {
                    <time>{ created }</time>
                }
                { badge }
            </header>
            <dl class="trip-stops">
                { for LocationField::ALL.into_iter().map(|field| html! {
                    <>
                        <dt>{ field.title() }</dt>
                        <dd>{ record.address_label(field) }</dd>
                    </>
                }) }
            </dl>
            <p class="trip-driver">{ format!("Driver: {}", record.driver_label()) }</p>
            <p class="trip-stats">
                { format!("{} • {} driving • {} total",
                    present::miles(plan.total_distance_miles),
                    present::hours(plan.total_driving_hours),
                    present::hours(plan.estimated_total_hours)) }
            </p>
            <div class="actions">
                <button type="button" class="btn-primary" onclick={on_view}>{ "View" }</button>
                <button type="button" class="btn-danger" onclick={on_delete} disabled={props.busy}>
                    { "Delete" }
                </button>
            </div>
        </article>
    }
}

/// Cards for every loaded record.
#[function_component(HistoryList)]
pub fn history_list(props: &HistoryListProps) -> Html {
    if props.book.is_empty() {
        return html! {
            <p class="empty-history">{ "No trips yet. Plan a trip to see it here." }</p>
        };
    }
    html! {
        <div class="trip-list">
            { for props.book.records().iter().map(|record| trip_card(record, props)) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct HistoryPageProps {
    pub services: SharedServices,
    pub on_open: Callback<TripView>,
    pub on_new_trip: Callback<()>,
}

#[function_component(HistoryPage)]
pub fn history_page(props: &HistoryPageProps) -> Html {
    // None until the first load finishes.
    let book = use_state(|| None::<HistoryBook>);
    let error = use_state(|| None::<String>);
    let busy = use_state(|| false);

    {
        let services = props.services.clone();
        let book = book.clone();
        let error = error.clone();
        use_effect_with((), move |()| {
            wasm_bindgen_futures::spawn_local(async move {
                match HistoryBook::load(&services.planner, services.config.history_limit).await {
                    Ok(loaded) => book.set(Some(loaded)),
                    Err(err) => {
                        log::error!("loading trip history failed: {err}");
                        error.set(Some(err.user_message(PlannerOperation::LoadHistory)));
                        book.set(Some(HistoryBook::default()));
                    }
                }
            });
        });
    }

    let on_view = {
        let book = book.clone();
        let error = error.clone();
        let on_open = props.on_open.clone();
        Callback::from(move |id: String| {
            match (*book).as_ref().and_then(|loaded| loaded.view(&id)) {
                Some(Ok(view)) => on_open.emit(view),
                Some(Err(err)) => {
                    log::error!("history record {id} is unusable: {err}");
                    error.set(Some(OPEN_FAILED.into()));
                }
                None => log::warn!("history record {id} is no longer loaded"),
            }
        })
    };

    let on_delete = {
        let services = props.services.clone();
        let book = book.clone();
        let error = error.clone();
        let busy = busy.clone();
        Callback::from(move |id: String| {
            if *busy || !dom::confirm("Are you sure you want to delete this trip?") {
                return;
            }
            let Some(mut next) = (*book).clone() else {
                return;
            };
            busy.set(true);
            let services = services.clone();
            let book = book.clone();
            let error = error.clone();
            let busy = busy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match next.delete(&services.planner, &id).await {
                    Ok(()) => {
                        error.set(None);
                        book.set(Some(next));
                    }
                    Err(err) => {
                        log::error!("deleting trip {id} failed: {err}");
                        error.set(Some(err.user_message(PlannerOperation::DeleteTrip)));
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_clear = {
        let services = props.services.clone();
        let book = book.clone();
        let error = error.clone();
        let busy = busy.clone();
        Callback::from(move |_: MouseEvent| {
            if *busy
                || !dom::confirm(
                    "Are you sure you want to delete all trip history? This cannot be undone.",
                )
            {
                return;
            }
            let Some(mut next) = (*book).clone() else {
                return;
            };
            busy.set(true);
            let services = services.clone();
            let book = book.clone();
            let error = error.clone();
            let busy = busy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match next.clear(&services.planner).await {
                    Ok(()) => {
                        error.set(None);
                        book.set(Some(next));
                    }
                    Err(err) => {
                        log::error!("clearing trip history failed: {err}");
                        error.set(Some(err.user_message(PlannerOperation::ClearHistory)));
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_new_trip = {
        let cb = props.on_new_trip.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let has_records = (*book).as_ref().is_some_and(|loaded| !loaded.is_empty());

    html! {
        <section class="panel history-page">
            <header class="page-header">
                <h1>{ "Trip History" }</h1>
                <div class="actions">
                    <button type="button" class="btn-secondary" onclick={on_new_trip}>{ "New Trip" }</button>
                    if has_records {
                        <button type="button" class="btn-danger" onclick={on_clear} disabled={*busy}>
                            { "Clear All History" }
                        </button>
                    }
                </div>
            </header>
            if let Some(message) = (*error).clone() {
                <div class="error-message" role="alert">{ message }</div>
            }
            {
                match (*book).clone() {
                    Some(loaded) => html! {
                        <HistoryList book={loaded} {on_view} {on_delete} busy={*busy} />
                    },
                    None => html! { <p class="loading">{ "Loading trip history..." }</p> },
                }
            }
        </section>
    }
}
