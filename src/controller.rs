//! Upload-and-render controller.
//!
//! The controller owns the submission lifecycle and nothing else: the page,
//! the file input and the network are injected as [`ResultView`],
//! [`ImageSource`] and [`AnalysisBackend`]. Everything runs on the single
//! browser thread, so shared state is a plain `Cell`.

use std::cell::Cell;

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::format::{confidence_percent, data_uri, step_label};
use crate::report::{AnalysisReport, ProcessingStep};

/// File picked by the user, already read into memory.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedImage {
    pub name: String,
    /// May be empty when the browser could not guess it.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedImage {
    pub fn validate(&self, max_bytes: u64) -> Result<(), UploadError> {
        if !self.mime.is_empty() && !self.mime.starts_with("image/") {
            return Err(UploadError::UnsupportedType(self.mime.clone()));
        }
        let size = self.bytes.len() as u64;
        if size > max_bytes {
            return Err(UploadError::TooLarge { size, limit: max_bytes });
        }
        Ok(())
    }

    pub fn data_uri(&self) -> String {
        data_uri(&self.mime, &self.bytes)
    }
}

/// The parts of the page the controller writes to.
pub trait ResultView {
    fn set_loading(&self, visible: bool);
    fn set_results_visible(&self, visible: bool);
    fn clear_steps(&self);
    fn add_step(&self, label: &str, step: &ProcessingStep);
    fn set_summary(&self, cancer_type: &str, cancer_stage: &str, confidence: &str);
    /// Sets the preview source and reveals it.
    fn show_preview(&self, src: &str);
    /// Drops the preview so it never shows a file other than the current one.
    fn hide_preview(&self);
    /// Blocking user notification.
    fn alert(&self, message: &str);
}

#[allow(async_fn_in_trait)]
pub trait ImageSource {
    /// `Ok(None)` when nothing is selected.
    async fn selected(&self) -> Result<Option<SelectedImage>, UploadError>;
}

#[allow(async_fn_in_trait)]
pub trait AnalysisBackend {
    /// Sends the image for analysis and returns the raw response body.
    async fn analyze(&self, image: &SelectedImage) -> Result<String, UploadError>;
}

/// Holds the busy flag for one submission. Dropping it hides the spinner,
/// whichever way the submission ended.
struct SubmitGuard<'a, V: ResultView> {
    busy: &'a Cell<bool>,
    view: &'a V,
}

impl<'a, V: ResultView> SubmitGuard<'a, V> {
    fn acquire(busy: &'a Cell<bool>, view: &'a V) -> Option<Self> {
        if busy.replace(true) {
            return None;
        }
        view.set_loading(true);
        Some(Self { busy, view })
    }
}

impl<V: ResultView> Drop for SubmitGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_loading(false);
        self.busy.set(false);
    }
}

pub struct UploadController<V, S, B> {
    view: V,
    source: S,
    backend: B,
    alert_prefix: String,
    max_upload_bytes: u64,
    busy: Cell<bool>,
}

impl<V, S, B> UploadController<V, S, B>
where
    V: ResultView,
    S: ImageSource,
    B: AnalysisBackend,
{
    pub fn new(config: &UploadConfig, view: V, source: S, backend: B) -> Self {
        Self {
            view,
            source,
            backend,
            alert_prefix: config.alert_prefix.clone(),
            max_upload_bytes: config.max_upload_bytes,
            busy: Cell::new(false),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Previews the current selection. A cancelled picker is not an error.
    pub async fn handle_file_selected(&self) -> Result<(), UploadError> {
        let result = self.preview().await;
        if let Err(e) = &result {
            self.view.hide_preview();
            self.report("preview", e);
        }
        result
    }

    async fn preview(&self) -> Result<(), UploadError> {
        let Some(image) = self.source.selected().await? else {
            log::debug!("file selection cleared");
            return Ok(());
        };
        image.validate(self.max_upload_bytes)?;
        self.view.show_preview(&image.data_uri());
        log::debug!("previewing `{}` ({} bytes)", image.name, image.bytes.len());
        Ok(())
    }

    /// Runs one submission. A second call while one is pending gets
    /// [`UploadError::Busy`] and leaves the page alone.
    pub async fn handle_submit(&self) -> Result<AnalysisReport, UploadError> {
        let Some(_guard) = SubmitGuard::acquire(&self.busy, &self.view) else {
            log::warn!("submission ignored: an analysis is already in progress");
            return Err(UploadError::Busy);
        };
        self.view.set_results_visible(false);

        let result = self.submit().await;
        match &result {
            Ok(report) => log::info!(
                "analysis done: {} / {} ({} steps)",
                report.cancer_type,
                report.cancer_stage,
                report.steps.len()
            ),
            Err(e) => self.report("analysis", e),
        }
        result
    }

    async fn submit(&self) -> Result<AnalysisReport, UploadError> {
        let image = self
            .source
            .selected()
            .await?
            .ok_or(UploadError::NoFileSelected)?;
        image.validate(self.max_upload_bytes)?;

        log::info!("uploading `{}` ({} bytes)", image.name, image.bytes.len());
        let body = self.backend.analyze(&image).await?;
        let report = AnalysisReport::decode(&body)?;
        self.render(&report);
        Ok(report)
    }

    fn render(&self, report: &AnalysisReport) {
        self.view.clear_steps();
        for step in &report.steps {
            self.view.add_step(&step_label(&step.name), step);
        }
        self.view.set_summary(
            &report.cancer_type,
            &report.cancer_stage,
            &confidence_percent(report.confidence),
        );
        self.view.set_results_visible(true);
    }

    fn report(&self, what: &str, err: &UploadError) {
        log::error!("{what} failed [{}]: {err}", err.kind());
        if err.is_user_facing() {
            self.view.alert(&format!("{}{err}", self.alert_prefix));
        }
    }
}
