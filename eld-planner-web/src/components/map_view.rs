//! Route map for the results page.
//!
//! The controller outlives individual views: each new trip disposes the old
//! widget and creates a fresh one, and late `ready` events or route responses
//! for a replaced widget are dropped by epoch.

use crate::app::services::SharedServices;
use crate::atlas::AtlasSurface;
use crate::dom;
use eld_planner_core::{Epoch, MapController, RouteRenderer, TripView};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use yew::prelude::*;

pub const MAP_CONTAINER_ID: &str = "trip-map";

type Controller = RefCell<Option<MapController<AtlasSurface>>>;

#[derive(Properties, PartialEq)]
pub struct MapViewProps {
    pub services: SharedServices,
    pub view: Rc<TripView>,
}

fn on_widget_ready(
    controller: Weak<Controller>,
    current_view: Rc<RefCell<Option<Rc<TripView>>>>,
    services: SharedServices,
) -> Callback<Epoch> {
    Callback::from(move |epoch: Epoch| {
        let Some(controller) = controller.upgrade() else {
            return;
        };
        let ready = controller
            .try_borrow_mut()
            .ok()
            .and_then(|mut slot| slot.as_mut().map(|ctl| ctl.on_ready(epoch)))
            .unwrap_or(false);
        let view = current_view.borrow().clone();
        let (true, Some(view)) = (ready, view) else {
            log::debug!("ignoring ready event for map widget {epoch}");
            return;
        };

        let renderer = RouteRenderer::new(services.maps.clone());
        let controller = Rc::downgrade(&controller);
        wasm_bindgen_futures::spawn_local(async move {
            let plan = renderer.plan(&view).await;
            if let Some(controller) = controller.upgrade()
                && let Some(ctl) = controller.borrow_mut().as_mut()
            {
                ctl.paint(epoch, &plan);
            }
        });
    })
}

#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    let controller: Rc<Controller> = use_mut_ref(|| None);
    let current_view = use_mut_ref(|| None::<Rc<TripView>>);
    let on_ready = on_widget_ready(
        Rc::downgrade(&controller),
        current_view.clone(),
        props.services.clone(),
    );

    {
        let services = props.services.clone();
        use_effect_with(props.view.clone(), move |view| {
            *current_view.borrow_mut() = Some(view.clone());
            {
                let mut slot = controller.borrow_mut();
                let ctl = slot.get_or_insert_with(|| {
                    MapController::new(
                        AtlasSurface::new(MAP_CONTAINER_ID, on_ready),
                        services.config.map.clone(),
                        services.config.maps_subscription_key.clone(),
                    )
                });
                if let Err(err) = ctl.sync(Some(view)) {
                    log::error!("map unavailable: {err}");
                    dom::console_error(&format!("map unavailable: {err}"));
                }
            }
            move || {
                if let Some(ctl) = controller.borrow_mut().as_mut() {
                    ctl.dispose();
                }
            }
        });
    }

    html! {
        <section class="map-panel">
            <h2>{ "Route Map" }</h2>
            <div id={MAP_CONTAINER_ID} class="trip-map" aria-label="Trip route map"></div>
        </section>
    }
}
