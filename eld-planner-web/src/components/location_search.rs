//! Address field with debounced suggestions.

use crate::app::services::Maps;
use crate::transport::BrowserTimer;
use eld_planner_core::{
    GeocodeCandidate, LocationField, LocationInput, SearchConfig, SearchController, SearchOutcome,
};
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub type WebSearch = SearchController<Rc<Maps>, BrowserTimer>;

/// One search controller for all three fields of a form.
#[derive(Clone)]
pub struct SharedSearch(pub Rc<WebSearch>);

impl SharedSearch {
    #[must_use]
    pub fn new(maps: Rc<Maps>, config: SearchConfig) -> Self {
        Self(Rc::new(SearchController::new(maps, BrowserTimer, config)))
    }
}

impl PartialEq for SharedSearch {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq)]
pub struct LocationSearchProps {
    pub field: LocationField,
    pub search: SharedSearch,
    #[prop_or_default]
    pub selected: Option<LocationInput>,
    /// A suggestion was picked.
    pub on_select: Callback<LocationInput>,
    /// The text changed, so any committed location no longer matches it.
    pub on_edit: Callback<()>,
}

#[function_component(LocationSearch)]
pub fn location_search(props: &LocationSearchProps) -> Html {
    let refresh = use_force_update();
    let field = props.field;
    let search = props.search.0.clone();
    let session = search.session(field);
    let input_id = format!("{}-location", field.key());

    let on_input = {
        let search = search.clone();
        let refresh = refresh.clone();
        let on_edit = props.on_edit.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            on_edit.emit(());
            if let Some(pending) = search.on_query_change(field, &input.value()) {
                let search = search.clone();
                let refresh = refresh.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = search.run(pending).await;
                    log::trace!("{field} search finished: {outcome:?}");
                    if outcome != SearchOutcome::Debounced {
                        refresh.force_update();
                    }
                });
            }
            refresh.force_update();
        })
    };

    let on_blur = {
        let search = search.clone();
        let refresh = refresh.clone();
        Callback::from(move |_: FocusEvent| {
            search.dismiss(field);
            refresh.force_update();
        })
    };

    // mousedown fires before the input's blur hides the list
    let suggestion = |candidate: &GeocodeCandidate| {
        let on_pick = {
            let search = search.clone();
            let refresh = refresh.clone();
            let on_select = props.on_select.clone();
            let candidate = candidate.clone();
            Callback::from(move |event: MouseEvent| {
                event.prevent_default();
                on_select.emit(search.select_candidate(field, &candidate));
                refresh.force_update();
            })
        };
        html! {
            <li class="suggestion" role="option" onmousedown={on_pick}>
                <strong>{ candidate.freeform_address.clone() }</strong>
                <span class="suggestion-detail">{ candidate.subtitle() }</span>
            </li>
        }
    };

    html! {
        <div class="form-group location-search">
            <label for={input_id.clone()}>{ field.title() }</label>
            <input
                id={input_id}
                type="text"
                autocomplete="off"
                placeholder="Search for an address or type lat, lon"
                value={session.query().to_string()}
                oninput={on_input}
                onblur={on_blur}
            />
            if let Some(selected) = props.selected.as_ref() {
                <p class="selected-coordinates">{ selected.coordinate.to_string() }</p>
            }
            if session.suggestions_visible() {
                <ul class="suggestions" role="listbox">
                    { for session.candidates().iter().map(suggestion) }
                </ul>
            }
        </div>
    }
}
