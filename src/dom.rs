//! Browser side of the controller: typed element handles, resolved once at
//! start-up, and the two event listeners.

use std::rc::Rc;

use anyhow::{Context as _, anyhow};
use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlFormElement, HtmlImageElement, HtmlInputElement,
    Window,
};

use crate::config::UploadConfig;
use crate::controller::{ImageSource, ResultView, SelectedImage, UploadController};
use crate::error::UploadError;
use crate::http::HttpBackend;
use crate::report::ProcessingStep;

/// Best-effort text for a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn element<T: JsCast>(document: &Document, id: &str) -> anyhow::Result<T> {
    document
        .get_element_by_id(id)
        .with_context(|| format!("no element with id `{id}`"))?
        .dyn_into::<T>()
        .map_err(|_| anyhow!("element `{id}` has an unexpected type"))
}

fn set_hidden(el: &Element, class: &str, hidden: bool) {
    let classes = el.class_list();
    let res = if hidden { classes.add_1(class) } else { classes.remove_1(class) };
    if let Err(e) = res {
        log::warn!("could not toggle `{class}` on #{}: {}", el.id(), js_message(&e));
    }
}

pub struct DomView {
    window: Window,
    document: Document,
    hidden_class: String,
    preview: HtmlImageElement,
    steps: HtmlElement,
    results: HtmlElement,
    spinner: HtmlElement,
    cancer_type: HtmlElement,
    cancer_stage: HtmlElement,
    confidence: HtmlElement,
}

impl DomView {
    fn step_card(&self, label: &str, step: &ProcessingStep) -> Result<Element, JsValue> {
        let col = self.document.create_element("div")?;
        col.set_class_name("col-md-6 mb-4");

        let card = self.document.create_element("div")?;
        card.set_class_name("card");

        let img = self.document.create_element("img")?.dyn_into::<HtmlImageElement>()?;
        img.set_class_name("card-img-top");
        img.set_src(&step.image);
        img.set_alt(&step.name);

        let body = self.document.create_element("div")?;
        body.set_class_name("card-body");
        let title = self.document.create_element("h5")?;
        title.set_class_name("card-title");
        title.set_text_content(Some(label));

        body.append_child(&title)?;
        card.append_child(&img)?;
        card.append_child(&body)?;
        col.append_child(&card)?;
        Ok(col)
    }
}

impl ResultView for DomView {
    fn set_loading(&self, visible: bool) {
        set_hidden(&self.spinner, &self.hidden_class, !visible);
    }

    fn set_results_visible(&self, visible: bool) {
        set_hidden(&self.results, &self.hidden_class, !visible);
    }

    fn clear_steps(&self) {
        self.steps.set_text_content(None);
    }

    fn add_step(&self, label: &str, step: &ProcessingStep) {
        let appended = self
            .step_card(label, step)
            .and_then(|card| self.steps.append_child(&card));
        if let Err(e) = appended {
            log::error!("could not render step `{}`: {}", step.name, js_message(&e));
        }
    }

    fn set_summary(&self, cancer_type: &str, cancer_stage: &str, confidence: &str) {
        self.cancer_type.set_text_content(Some(cancer_type));
        self.cancer_stage.set_text_content(Some(cancer_stage));
        self.confidence.set_text_content(Some(confidence));
    }

    fn show_preview(&self, src: &str) {
        self.preview.set_src(src);
        set_hidden(&self.preview, &self.hidden_class, false);
    }

    fn hide_preview(&self) {
        set_hidden(&self.preview, &self.hidden_class, true);
        if let Err(e) = self.preview.remove_attribute("src") {
            log::warn!("could not clear the preview: {}", js_message(&e));
        }
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            log::error!("alert failed: {}", js_message(&e));
        }
    }
}

/// Reads the first file of the `<input type="file">`.
pub struct DomFileInput {
    input: HtmlInputElement,
    max_upload_bytes: u64,
}

impl ImageSource for DomFileInput {
    async fn selected(&self) -> Result<Option<SelectedImage>, UploadError> {
        let Some(file) = self.input.files().and_then(|list| list.get(0)) else {
            return Ok(None);
        };
        // Checked before reading so a huge file is never pulled into memory.
        let size = file.size() as u64;
        if size > self.max_upload_bytes {
            return Err(UploadError::TooLarge { size, limit: self.max_upload_bytes });
        }

        let buffer = JsFuture::from(file.array_buffer())
            .await
            .map_err(|e| UploadError::FileRead(js_message(&e)))?;
        Ok(Some(SelectedImage {
            name: file.name(),
            mime: file.type_(),
            bytes: Uint8Array::new(&buffer).to_vec(),
        }))
    }
}

/// Every element the controller needs, looked up by id exactly once.
pub struct DomPage {
    pub form: HtmlFormElement,
    pub view: DomView,
    pub input: DomFileInput,
}

impl DomPage {
    pub fn from_document(window: Window, document: Document, config: &UploadConfig) -> anyhow::Result<Self> {
        let ids = &config.ids;
        let input: HtmlInputElement = element(&document, &ids.file_input)?;
        Ok(Self {
            form: element(&document, &ids.form)?,
            input: DomFileInput { input, max_upload_bytes: config.max_upload_bytes },
            view: DomView {
                hidden_class: config.hidden_class.clone(),
                preview: element(&document, &ids.preview)?,
                steps: element(&document, &ids.steps)?,
                results: element(&document, &ids.results)?,
                spinner: element(&document, &ids.spinner)?,
                cancer_type: element(&document, &ids.cancer_type)?,
                cancer_stage: element(&document, &ids.cancer_stage)?,
                confidence: element(&document, &ids.confidence)?,
                window,
                document,
            },
        })
    }
}

/// Hooks `submit` on the form and `change` on the file input.
pub fn bind(page: DomPage, config: &UploadConfig) -> Result<(), JsValue> {
    let form = page.form;
    let input = page.input.input.clone();
    let controller = Rc::new(UploadController::new(
        config,
        page.view,
        page.input,
        HttpBackend::new(config),
    ));

    let c = Rc::clone(&controller);
    let on_submit = Closure::wrap(Box::new(move |event: Event| {
        event.prevent_default();
        let c = Rc::clone(&c);
        spawn_local(async move {
            // Failures are already logged and alerted by the controller.
            let _ = c.handle_submit().await;
        });
    }) as Box<dyn FnMut(Event)>);
    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();

    let c = controller;
    let on_change = Closure::wrap(Box::new(move |_event: Event| {
        let c = Rc::clone(&c);
        spawn_local(async move {
            let _ = c.handle_file_selected().await;
        });
    }) as Box<dyn FnMut(Event)>);
    input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    on_change.forget();

    log::info!("upload form bound, posting to {}", config.endpoint);
    Ok(())
}
