use crate::models::{ImagePointer, MultimodalPart, ResponseContent};
use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedContent {
    pub text: Option<String>,
    pub image: Option<ImagePointer>,
}

/// Reduce a backend content object to displayable text or an image
/// reference. Unrecognized content types are silently dropped.
pub fn normalize(content: &ResponseContent) -> NormalizedContent {
    match content {
        ResponseContent::Text { parts } => NormalizedContent {
            text: Some(remove_citations(
                parts.first().map(String::as_str).unwrap_or(""),
            )),
            image: None,
        },
        ResponseContent::Code { text } => NormalizedContent {
            text: Some(format!("_{}_", text)),
            image: None,
        },
        ResponseContent::MultimodalText { parts } => {
            for part in parts {
                if let MultimodalPart::ImageAssetPointer(pointer) = part {
                    return NormalizedContent {
                        text: None,
                        image: Some(pointer.clone()),
                    };
                }
            }
            NormalizedContent::default()
        }
        ResponseContent::Unknown => NormalizedContent::default(),
    }
}

/// Strip bracketed footnote markers like `【3†source】`.
fn remove_citations(text: &str) -> String {
    let citation_regex = Regex::new(r"【\d+†source】").unwrap();
    citation_regex.replace_all(text, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_strips_citations() {
        let content = ResponseContent::Text {
            parts: vec!["see 【3†source】 result".to_string()],
        };
        let normalized = normalize(&content);
        assert_eq!(normalized.text.as_deref(), Some("see  result"));
        assert!(normalized.image.is_none());
    }

    #[test]
    fn test_text_content_without_parts_is_empty() {
        let content = ResponseContent::Text { parts: vec![] };
        assert_eq!(normalize(&content).text.as_deref(), Some(""));
    }

    #[test]
    fn test_code_content_is_wrapped_in_emphasis() {
        let content = ResponseContent::Code {
            text: "x=1".to_string(),
        };
        assert_eq!(normalize(&content).text.as_deref(), Some("_x=1_"));
    }

    #[test]
    fn test_multimodal_yields_first_image_pointer() {
        let content: ResponseContent = serde_json::from_str(
            r#"{
                "content_type": "multimodal_text",
                "parts": [
                    {"content_type": "audio_transcription"},
                    {"content_type": "image_asset_pointer", "asset_pointer": "file-service://abc", "width": 512, "height": 512},
                    {"content_type": "image_asset_pointer", "asset_pointer": "file-service://def"}
                ]
            }"#,
        )
        .unwrap();

        let normalized = normalize(&content);
        assert!(normalized.text.is_none());
        assert_eq!(
            normalized.image.unwrap().asset_pointer.as_deref(),
            Some("file-service://abc")
        );
    }

    #[test]
    fn test_unrecognized_content_is_dropped() {
        assert_eq!(normalize(&ResponseContent::Unknown), NormalizedContent::default());
    }
}
