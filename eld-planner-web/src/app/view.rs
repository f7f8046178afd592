use crate::app::state::AppState;
use crate::components::footer::Footer;
use crate::pages::{
    history::HistoryPage, home::HomePage, not_found::NotFound, results::ResultsPage,
};
use crate::router::Route;
use chrono::Datelike;
use eld_planner_core::TripView;
use yew::prelude::*;
use yew_router::prelude::Navigator;

fn go_to(navigator: Option<&Navigator>, route: Route) -> Callback<()> {
    let navigator = navigator.cloned();
    Callback::from(move |()| {
        if let Some(nav) = navigator.as_ref() {
            nav.push(&route);
        }
    })
}

pub fn render_app(state: &AppState, route: Option<&Route>, navigator: Option<Navigator>) -> Html {
    let navigator = navigator.as_ref();
    let open_trip = {
        let state = state.clone();
        let navigator = navigator.cloned();
        Callback::from(move |view: TripView| {
            state.show_trip(view);
            if let Some(nav) = navigator.as_ref() {
                nav.push(&Route::Results);
            }
        })
    };

    let page = match route.unwrap_or(&Route::NotFound) {
        Route::Home => html! {
            <HomePage
                services={state.services.clone()}
                on_planned={open_trip}
                on_history={go_to(navigator, Route::History)}
            />
        },
        Route::Results => html! {
            <ResultsPage
                services={state.services.clone()}
                view={(*state.trip).clone()}
                on_new_trip={go_to(navigator, Route::Home)}
                on_history={go_to(navigator, Route::History)}
            />
        },
        Route::History => html! {
            <HistoryPage
                services={state.services.clone()}
                on_open={open_trip}
                on_new_trip={go_to(navigator, Route::Home)}
            />
        },
        Route::NotFound => html! { <NotFound on_go_home={go_to(navigator, Route::Home)} /> },
    };

    let year = crate::dom::today().map(|date| date.year());
    html! {
        <div class="app">
            <main id="main" role="main">{ page }</main>
            <Footer {year} />
        </div>
    }
}
