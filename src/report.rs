//! Typed decode of the `/analyze` response.
//!
//! The server answers either `{ "error": "..." }` or a full report. The HTTP
//! status is not consulted: a non-empty `error` always wins.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::UploadError;

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessingStep {
    pub name: String,
    /// Anything an `<img src>` accepts, usually a data URI.
    pub image: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisReport {
    /// In the order the server listed them.
    pub steps: Vec<ProcessingStep>,
    pub cancer_type: String,
    pub cancer_stage: String,
    /// Normalized to [0, 1].
    pub confidence: f64,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    error: Option<String>,
    processed_images: Option<Map<String, Value>>,
    cancer_type: Option<String>,
    cancer_stage: Option<String>,
    confidence: Option<f64>,
}

fn missing(field: &str) -> UploadError {
    UploadError::MalformedResponse(format!("missing field `{field}`"))
}

impl AnalysisReport {
    pub fn decode(body: &str) -> Result<Self, UploadError> {
        let wire: WireResponse = serde_json::from_str(body)
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;

        if let Some(msg) = wire.error.filter(|m| !m.is_empty()) {
            return Err(UploadError::Server(msg));
        }

        let images = wire.processed_images.ok_or_else(|| missing("processed_images"))?;
        let steps = images
            .into_iter()
            .map(|(name, value)| match value {
                Value::String(image) => Ok(ProcessingStep { name, image }),
                other => Err(UploadError::MalformedResponse(format!(
                    "image for step `{name}` is not a string: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let confidence = wire.confidence.ok_or_else(|| missing("confidence"))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(UploadError::MalformedResponse(format!(
                "confidence {confidence} outside [0, 1]"
            )));
        }

        Ok(Self {
            steps,
            cancer_type: wire.cancer_type.ok_or_else(|| missing("cancer_type"))?,
            cancer_stage: wire.cancer_stage.ok_or_else(|| missing("cancer_stage"))?,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MELANOMA: &str = r#"{
        "cancer_type": "Melanoma",
        "cancer_stage": "II",
        "confidence": 0.915,
        "processed_images": {
            "grayscale": "data:image/png;base64,AAAA",
            "edges": "data:image/png;base64,BBBB"
        }
    }"#;

    #[test]
    fn decodes_a_full_report_in_server_order() {
        let report = AnalysisReport::decode(MELANOMA).unwrap();
        assert_eq!(report.cancer_type, "Melanoma");
        assert_eq!(report.cancer_stage, "II");
        assert_eq!(report.confidence, 0.915);
        let names: Vec<_> = report.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["grayscale", "edges"]);
        assert_eq!(report.steps[1].image, "data:image/png;base64,BBBB");
    }

    #[test]
    fn order_is_not_alphabetical() {
        let body = r#"{"cancer_type":"t","cancer_stage":"s","confidence":0.5,
            "processed_images":{"threshold":"a","original":"b","masked":"c"}}"#;
        let report = AnalysisReport::decode(body).unwrap();
        let names: Vec<_> = report.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["threshold", "original", "masked"]);
    }

    #[test]
    fn error_field_wins_over_everything() {
        let err = AnalysisReport::decode(r#"{"error":"No file provided"}"#).unwrap_err();
        assert_eq!(err, UploadError::Server("No file provided".into()));

        let with_report = MELANOMA.replacen('{', r#"{"error":"model offline","#, 1);
        assert_eq!(
            AnalysisReport::decode(&with_report).unwrap_err(),
            UploadError::Server("model offline".into())
        );
    }

    #[test]
    fn empty_or_null_error_is_ignored() {
        let body = MELANOMA.replacen('{', r#"{"error":"","#, 1);
        assert!(AnalysisReport::decode(&body).is_ok());
        let body = MELANOMA.replacen('{', r#"{"error":null,"#, 1);
        assert!(AnalysisReport::decode(&body).is_ok());
    }

    #[test]
    fn malformed_bodies() {
        let cases = [
            "<html>502 Bad Gateway</html>",
            r#"{"cancer_type":"t","cancer_stage":"s","confidence":0.5}"#,
            r#"{"processed_images":{},"cancer_stage":"s","confidence":0.5}"#,
            r#"{"processed_images":{"a":1},"cancer_type":"t","cancer_stage":"s","confidence":0.5}"#,
            r#"{"processed_images":{},"cancer_type":"t","cancer_stage":"s","confidence":"high"}"#,
            r#"{"processed_images":{},"cancer_type":"t","cancer_stage":"s","confidence":1.5}"#,
        ];
        for body in cases {
            match AnalysisReport::decode(body) {
                Err(UploadError::MalformedResponse(_)) => {}
                other => panic!("{body}: expected MalformedResponse, got {other:?}"),
            }
        }
    }

    #[test]
    fn null_labels_are_malformed() {
        for body in [
            r#"{"processed_images":{},"cancer_type":null,"cancer_stage":"s","confidence":0.5}"#,
            r#"{"processed_images":{},"cancer_type":"t","cancer_stage":null,"confidence":0.5}"#,
        ] {
            assert!(matches!(
                AnalysisReport::decode(body),
                Err(UploadError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn empty_step_map_is_valid() {
        let body = r#"{"processed_images":{},"cancer_type":"t","cancer_stage":"s","confidence":0}"#;
        assert!(AnalysisReport::decode(body).unwrap().steps.is_empty());
    }
}
