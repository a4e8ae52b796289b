pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod report;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod http;

pub use config::UploadConfig;
pub use controller::{AnalysisBackend, ImageSource, ResultView, SelectedImage, UploadController};
pub use error::UploadError;
pub use report::{AnalysisReport, ProcessingStep};

// ── Web entry‑point ──
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, prelude::*};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Redirect `log` macros & panic messages to the browser console
    console_log::init_with_level(log::Level::Debug).ok();
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    // The module may be instantiated from <head>, before the form exists.
    if document.ready_state() != "loading" {
        return mount(window, document).map_err(to_js);
    }
    let target = document.clone();
    let on_ready = Closure::once(move || {
        if let Err(e) = mount(window, document) {
            log::error!("upload form not mounted: {e:#}");
        }
    });
    target.add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
    on_ready.forget();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn mount(window: web_sys::Window, document: web_sys::Document) -> anyhow::Result<()> {
    use anyhow::Context as _;

    let config = match document
        .query_selector(&format!("[{}]", UploadConfig::ATTRIBUTE))
        .map_err(|e| anyhow::anyhow!("{e:?}"))?
        .and_then(|el| el.get_attribute(UploadConfig::ATTRIBUTE))
    {
        Some(raw) => UploadConfig::from_json(&raw).context("invalid upload config")?,
        None => UploadConfig::default(),
    };

    let page = dom::DomPage::from_document(window, document, &config)?;
    dom::bind(page, &config).map_err(|e| anyhow::anyhow!("{e:?}"))
}

#[cfg(target_arch = "wasm32")]
fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}
