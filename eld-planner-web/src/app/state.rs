use crate::app::services::{Services, SharedServices};
use eld_planner_core::TripView;
use std::rc::Rc;
use yew::prelude::*;

#[derive(Clone)]
pub struct AppState {
    pub services: SharedServices,
    /// Trip shown on the results page, from a fresh plan or from history.
    pub trip: UseStateHandle<Option<Rc<TripView>>>,
}

#[hook]
pub fn use_app_state() -> AppState {
    let services = use_memo((), |_| {
        SharedServices::new(Services::from_config(crate::paths::client_config()))
    });
    AppState {
        services: (*services).clone(),
        trip: use_state(|| None::<Rc<TripView>>),
    }
}

impl AppState {
    pub fn show_trip(&self, view: TripView) {
        log::info!("showing trip {}", view.result.trip_id);
        self.trip.set(Some(Rc::new(view)));
    }
}
