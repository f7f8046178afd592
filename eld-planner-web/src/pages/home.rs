use crate::app::services::SharedServices;
use crate::components::location_search::{LocationSearch, SharedSearch};
use eld_planner_core::{
    HosOptions, LocationField, LocationInput, PlannerOperation, TripForm, TripView, WeeklyMode,
};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct HomePageProps {
    pub services: SharedServices,
    pub on_planned: Callback<TripView>,
    pub on_history: Callback<()>,
}

/// Text inputs of the driver section, keyed for a shared change handler.
#[derive(Clone, Copy, PartialEq, Eq)]
enum DriverField {
    Driver,
    Carrier,
    Office,
    Vehicle,
    CycleUsed,
}

impl DriverField {
    const ALL: [Self; 5] = [
        Self::CycleUsed,
        Self::Driver,
        Self::Carrier,
        Self::Office,
        Self::Vehicle,
    ];

    const fn id(self) -> &'static str {
        match self {
            Self::Driver => "driver-name",
            Self::Carrier => "carrier-name",
            Self::Office => "main-office",
            Self::Vehicle => "vehicle-number",
            Self::CycleUsed => "cycle-used",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Driver => "Driver Name",
            Self::Carrier => "Carrier Name",
            Self::Office => "Main Office Address",
            Self::Vehicle => "Vehicle Number",
            Self::CycleUsed => "Current Cycle Used (hours)",
        }
    }

    fn value(self, form: &TripForm) -> &str {
        match self {
            Self::Driver => &form.driver.driver_name,
            Self::Carrier => &form.driver.carrier_name,
            Self::Office => &form.driver.main_office,
            Self::Vehicle => &form.driver.vehicle_number,
            Self::CycleUsed => &form.cycle_used,
        }
    }

    fn set(self, form: &mut TripForm, value: String) {
        match self {
            Self::Driver => form.driver.driver_name = value,
            Self::Carrier => form.driver.carrier_name = value,
            Self::Office => form.driver.main_office = value,
            Self::Vehicle => form.driver.vehicle_number = value,
            Self::CycleUsed => form.cycle_used = value,
        }
    }
}

/// Which HOS exception a checkbox toggles.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Exception {
    SplitSleeper,
    Adverse,
    AirMile,
}

impl Exception {
    const ALL: [Self; 3] = [Self::SplitSleeper, Self::Adverse, Self::AirMile];

    const fn label(self) -> &'static str {
        match self {
            Self::SplitSleeper => "Use split sleeper berth (8/2 or 7/3)",
            Self::Adverse => "Adverse driving conditions (+2 hours)",
            Self::AirMile => "150 air-mile short-haul exception",
        }
    }

    const fn is_set(self, hos: &HosOptions) -> bool {
        match self {
            Self::SplitSleeper => hos.use_split_sleeper,
            Self::Adverse => hos.use_adverse_conditions,
            Self::AirMile => hos.use_air_mile_exception,
        }
    }

    const fn toggle(self, hos: &mut HosOptions) {
        match self {
            Self::SplitSleeper => hos.use_split_sleeper = !hos.use_split_sleeper,
            Self::Adverse => hos.use_adverse_conditions = !hos.use_adverse_conditions,
            Self::AirMile => hos.use_air_mile_exception = !hos.use_air_mile_exception,
        }
    }
}

#[function_component(HomePage)]
pub fn home_page(props: &HomePageProps) -> Html {
    let form = use_state(TripForm::default);
    let loading = use_state(|| false);
    let error = use_state(|| None::<String>);
    let search = {
        let maps = props.services.maps.clone();
        let config = props.services.config.search.clone();
        use_memo((), move |_| SharedSearch::new(maps, config))
    };

    let location_field = |field: LocationField| {
        let on_select = {
            let form = form.clone();
            Callback::from(move |input: LocationInput| {
                let mut next = (*form).clone();
                next.set_location(field, input);
                form.set(next);
            })
        };
        let on_edit = {
            let form = form.clone();
            Callback::from(move |()| {
                if form.location(field).is_some() {
                    let mut next = (*form).clone();
                    next.clear_location(field);
                    form.set(next);
                }
            })
        };
        html! {
            <LocationSearch
                {field}
                search={(*search).clone()}
                selected={form.location(field).cloned()}
                {on_select}
                {on_edit}
            />
        }
    };

    let text_field = |which: DriverField| {
        let on_input = {
            let form = form.clone();
            Callback::from(move |event: InputEvent| {
                let input: HtmlInputElement = event.target_unchecked_into();
                let mut next = (*form).clone();
                which.set(&mut next, input.value());
                form.set(next);
            })
        };
        let kind = if which == DriverField::CycleUsed { "number" } else { "text" };
        html! {
            <div class="form-group">
                <label for={which.id()}>{ which.label() }</label>
                <input
                    id={which.id()}
                    type={kind}
                    value={which.value(&form).to_string()}
                    oninput={on_input}
                />
            </div>
        }
    };

    let on_mode = {
        let form = form.clone();
        Callback::from(move |event: Event| {
            let select: HtmlSelectElement = event.target_unchecked_into();
            if let Some(mode) = WeeklyMode::from_code(&select.value()) {
                let mut next = (*form).clone();
                next.hos.weekly_mode = mode;
                form.set(next);
            }
        })
    };

    let exception_box = |exception: Exception| {
        let checked = exception.is_set(&form.hos);
        let on_toggle = {
            let form = form.clone();
            Callback::from(move |_: Event| {
                let mut next = (*form).clone();
                exception.toggle(&mut next.hos);
                form.set(next);
            })
        };
        html! {
            <label class="checkbox">
                <input type="checkbox" {checked} onchange={on_toggle} />
                { exception.label() }
            </label>
        }
    };

    let on_submit = {
        let form = form.clone();
        let loading = loading.clone();
        let error = error.clone();
        let search = search.clone();
        let services = props.services.clone();
        let on_planned = props.on_planned.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            if *loading {
                return;
            }
            let mut draft = (*form).clone();
            for field in LocationField::ALL {
                draft.accept_typed_location(field, search.0.session(field).query());
            }
            if draft != *form {
                form.set(draft.clone());
            }
            let request = match draft.to_request() {
                Ok(request) => request,
                Err(err) => {
                    error.set(Some(err.to_string()));
                    return;
                }
            };

            error.set(None);
            loading.set(true);
            let services = services.clone();
            let loading = loading.clone();
            let error = error.clone();
            let on_planned = on_planned.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match services.planner.plan_trip(&request).await {
                    Ok(result) => on_planned.emit(TripView::from_submission(&request, result)),
                    Err(err) => {
                        log::error!("trip planning failed: {err}");
                        error.set(Some(err.user_message(PlannerOperation::PlanTrip)));
                    }
                }
                loading.set(false);
            });
        })
    };

    let on_history = {
        let cb = props.on_history.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let selected_mode = form.hos.weekly_mode;

    html! {
        <section class="panel home-page">
            <header class="page-header">
                <h1>{ "ELD Trip Planner" }</h1>
                <p>{ "Plan HOS-compliant trips and generate driver logs." }</p>
                <button type="button" class="btn-secondary" onclick={on_history}>
                    { "Trip History" }
                </button>
            </header>
            <form class="trip-form" onsubmit={on_submit}>
                <fieldset>
                    <legend>{ "Route" }</legend>
                    { for LocationField::ALL.into_iter().map(location_field) }
                </fieldset>
                <fieldset>
                    <legend>{ "Driver & Cycle" }</legend>
                    { for DriverField::ALL.into_iter().map(text_field) }
                </fieldset>
                <fieldset>
                    <legend>{ "Hours of Service Options" }</legend>
                    <div class="form-group">
                        <label for="weekly-mode">{ "Weekly Limit" }</label>
                        <select id="weekly-mode" onchange={on_mode}>
                            { for WeeklyMode::ALL.into_iter().map(|mode| html! {
                                <option value={mode.code()} selected={mode == selected_mode}>
                                    { mode.description() }
                                </option>
                            }) }
                        </select>
                    </div>
                    { for Exception::ALL.into_iter().map(exception_box) }
                </fieldset>
                if let Some(message) = (*error).clone() {
                    <div class="error-message" role="alert">{ message }</div>
                }
                <button type="submit" class="btn-primary" disabled={*loading}>
                    { if *loading { "Calculating Trip..." } else { "Plan Trip" } }
                </button>
            </form>
        </section>
    }
}
