//! APIレスポンスパーサー
//!
//! Step1の応答テキストからJSON文書を取り出してパースする

use crate::error::{Error, Result};
use crate::types::ExtractionResult;

/// 応答テキストからJSON部分を抽出
///
/// 全体がそのままJSONとして読めればそれを返す。
/// JSONモードでも稀に ```json ... ``` で囲まれて返るため、読めない場合に限り囲みの中身を使う。
///
/// # Examples
/// ```
/// use medreport_common::extract_json;
///
/// let response = "```json\n{\"key\": \"value\"}\n```";
/// assert_eq!(extract_json(response), "{\"key\": \"value\"}");
/// ```
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if serde_json::from_str::<serde::de::IgnoredAny>(trimmed).is_ok() {
        return trimmed;
    }

    if let Some(start_marker) = trimmed.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = trimmed[start..].find("```") {
            return trimmed[start..start + end_offset].trim();
        }
    }

    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(body) = rest.strip_suffix("```") {
            return body.trim();
        }
    }

    trimmed
}

/// Step1の応答テキストをパース
///
/// 構文的に正しいJSONであれば形は問わない（スキーマ検証はしない）
pub fn parse_extraction_text(text: &str) -> Result<ExtractionResult> {
    let json_str = extract_json(text);
    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| Error::MalformedResponse(format!("text is not valid JSON: {}", e)))?;
    Ok(ExtractionResult::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_plain() {
        assert_eq!(extract_json("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_with_block() {
        let response = "Here is the data:\n```json\n{\"vitalSigns\": {}}\n```\nDone.";
        assert_eq!(extract_json(response), "{\"vitalSigns\": {}}");
    }

    #[test]
    fn test_extract_json_keeps_fence_inside_string_value() {
        let text = r#"{"notes": "see ```json block``` in chart", "age": 42}"#;
        assert_eq!(extract_json(text), text);

        let result = parse_extraction_text(text).unwrap();
        assert_eq!(result.value()["notes"], "see ```json block``` in chart");
        assert_eq!(result.value()["age"], 42);
    }

    #[test]
    fn test_extract_json_with_bare_fence() {
        assert_eq!(extract_json("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_parse_extraction_text_object() {
        let result =
            parse_extraction_text(r#"{"patientInformation": {"name": "Jane Doe", "age": 42}}"#)
                .unwrap();
        assert_eq!(
            result.value(),
            &json!({"patientInformation": {"name": "Jane Doe", "age": 42}})
        );
    }

    #[test]
    fn test_parse_extraction_text_passes_through_unexpected_shapes() {
        let result = parse_extraction_text(r#"[{"medication": "Aspirin"}]"#).unwrap();
        assert!(result.value().is_array());

        let result = parse_extraction_text(r#"{"vitalSigns": "not an object"}"#).unwrap();
        assert_eq!(result.value()["vitalSigns"], "not an object");
    }

    #[test]
    fn test_parse_extraction_text_invalid() {
        let err = parse_extraction_text("Sorry, I cannot read this image.").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
        assert!(err.to_string().starts_with("Could not extract data."));
    }

    #[test]
    fn test_parse_extraction_text_truncated() {
        let err = parse_extraction_text(r#"{"laboratoryResults": [{"test": "Hb""#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
