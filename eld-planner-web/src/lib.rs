//! Browser front-end of the ELD trip planner.
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod app;
pub mod atlas;
pub mod components;
pub mod dom;
pub mod pages;
pub mod paths;
pub mod router;
pub mod transport;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    if console_log::init_with_level(level).is_err() {
        dom::console_error("logger already initialised");
    }
    yew::Renderer::<app::App>::new().render();
}

