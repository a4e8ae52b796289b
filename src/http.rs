use gloo_net::http::Request;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData};

use crate::config::UploadConfig;
use crate::controller::{AnalysisBackend, SelectedImage};
use crate::dom::js_message;
use crate::error::UploadError;

/// POSTs the image as `multipart/form-data` to the analysis endpoint.
pub struct HttpBackend {
    endpoint: String,
    field_name: String,
}

impl HttpBackend {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            field_name: config.field_name.clone(),
        }
    }
}

fn transport(err: gloo_net::Error) -> UploadError {
    UploadError::Transport(err.to_string())
}

fn multipart(field: &str, image: &SelectedImage) -> Result<FormData, JsValue> {
    let parts = Array::of1(&Uint8Array::from(image.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(&image.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

    let form = FormData::new()?;
    form.append_with_blob_and_filename(field, &blob, &image.name)?;
    Ok(form)
}

impl AnalysisBackend for HttpBackend {
    async fn analyze(&self, image: &SelectedImage) -> Result<String, UploadError> {
        let form = multipart(&self.field_name, image)
            .map_err(|e| UploadError::Transport(js_message(&e)))?;

        let response = Request::post(&self.endpoint)
            .body(form)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        // The status is not checked: error replies still carry a JSON body.
        log::debug!("{} answered {}", self.endpoint, response.status());

        response.text().await.map_err(transport)
    }
}
