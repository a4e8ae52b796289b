use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Card title for a processing step: first letter upper-cased, rest untouched.
pub fn step_label(step: &str) -> String {
    let mut chars = step.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `0.8234` -> `"82.3%"`. Halfway values round up, as `toFixed(1)` does.
pub fn confidence_percent(confidence: f64) -> String {
    format!("{:.1}%", (confidence * 1000.0).round() / 10.0)
}

/// Same shape `FileReader::readAsDataURL` produces.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let mime = if mime.is_empty() { "application/octet-stream" } else { mime };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_capitalize_only_the_first_letter() {
        assert_eq!(step_label("grayscale"), "Grayscale");
        assert_eq!(step_label("edges"), "Edges");
        assert_eq!(step_label("nodule segmentation"), "Nodule segmentation");
        assert_eq!(step_label("Original"), "Original");
        assert_eq!(step_label(""), "");
        assert_eq!(step_label("ßtep"), "SStep");
    }

    #[test]
    fn confidence_has_one_decimal() {
        assert_eq!(confidence_percent(0.8234), "82.3%");
        assert_eq!(confidence_percent(0.915), "91.5%");
        assert_eq!(confidence_percent(1.0), "100.0%");
        assert_eq!(confidence_percent(0.0), "0.0%");
        assert_eq!(confidence_percent(0.0625), "6.3%");
        assert_eq!(confidence_percent(0.1875), "18.8%");
        assert_eq!(confidence_percent(0.3125), "31.3%");
    }

    #[test]
    fn data_uri_encodes_bytes() {
        assert_eq!(data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
        assert_eq!(data_uri("", b""), "data:application/octet-stream;base64,");
    }
}
