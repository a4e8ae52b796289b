use serde::Deserialize;

/// 16 MiB, the same cap the analysis server enforces.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Ids of the page elements the controller binds to.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub form: String,
    pub file_input: String,
    pub preview: String,
    pub steps: String,
    pub results: String,
    pub spinner: String,
    pub cancer_type: String,
    pub cancer_stage: String,
    pub confidence: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            form: "upload-form".into(),
            file_input: "image-input".into(),
            preview: "preview-image".into(),
            steps: "processing-steps".into(),
            results: "result-section".into(),
            spinner: "loading-spinner".into(),
            cancer_type: "cancer-type".into(),
            cancer_stage: "cancer-stage".into(),
            confidence: "confidence".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Path the multipart form is POSTed to.
    pub endpoint: String,
    /// Multipart field carrying the image.
    pub field_name: String,
    pub max_upload_bytes: u64,
    /// Class that hides an element (Bootstrap's `d-none`).
    pub hidden_class: String,
    pub alert_prefix: String,
    pub ids: ElementIds,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "/analyze".into(),
            field_name: "image".into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            hidden_class: "d-none".into(),
            alert_prefix: "Error processing image: ".into(),
            ids: ElementIds::default(),
        }
    }
}

impl UploadConfig {
    /// Name of the form attribute that may carry a JSON override.
    pub const ATTRIBUTE: &'static str = "data-upload-config";

    /// Parses an override; missing keys keep their defaults.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        if cfg.endpoint.is_empty() {
            anyhow::bail!("upload endpoint must not be empty");
        }
        if cfg.field_name.is_empty() {
            anyhow::bail!("multipart field name must not be empty");
        }
        Ok(cfg)
    }
}
