pub mod api;
pub mod app;
pub mod components;
pub mod config;
pub mod context;
pub mod markdown;
pub mod state;
pub mod types;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    leptos::mount::hydrate_body(App);
}
