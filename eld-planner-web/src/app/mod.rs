#[cfg(target_arch = "wasm32")]
use crate::router::Route;
#[cfg(target_arch = "wasm32")]
use yew::prelude::*;
#[cfg(target_arch = "wasm32")]
use yew_router::prelude::*;

pub mod services;
pub mod state;
#[cfg(target_arch = "wasm32")]
pub mod view;

pub use services::{Services, SharedServices};

#[cfg(target_arch = "wasm32")]
#[function_component(App)]
pub fn app() -> Html {
    let router_base = crate::paths::router_base().map(AttrValue::from);
    html! {
        <BrowserRouter basename={router_base}>
            <AppInner />
        </BrowserRouter>
    }
}

#[cfg(target_arch = "wasm32")]
#[function_component(AppInner)]
pub fn app_inner() -> Html {
    let app_state = state::use_app_state();
    let navigator = use_navigator();
    let route = use_route::<Route>();
    view::render_app(&app_state, route.as_ref(), navigator)
}
