//! 抽出/説明オーケストレーター
//!
//! Step1: 画像 → 構造化JSON（必須）
//! Step2: JSON → 患者向け説明（Variant::ExtractAndExplain のときのみ、Step1成功後）
//!
//! Step2の失敗は全体の失敗にしない。Step1の結果を返し、説明のエラーを別に持たせる。

use crate::error::{Error, Result};
use crate::gemini::{build_extraction_request, build_text_request, GeminiClient, Transport};
use crate::markup::Markup;
use crate::parser::parse_extraction_text;
use crate::payload::encode_to_payload;
use crate::prompts::{build_explanation_prompt, EXTRACTION_PROMPT};
use crate::types::{EncodedImage, ExtractionResult, UploadedImage, Variant};

/// 1回の解析の結果
#[derive(Debug)]
pub struct AttemptReport {
    pub result: ExtractionResult,
    pub explanation: Option<Markup>,
    /// Step2が失敗した場合のエラー（部分成功）
    pub explanation_error: Option<Error>,
}

impl AttemptReport {
    fn extracted(result: ExtractionResult) -> Self {
        Self {
            result,
            explanation: None,
            explanation_error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Orchestrator<T> {
    client: GeminiClient<T>,
    variant: Variant,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(transport: T, variant: Variant) -> Self {
        Self {
            client: GeminiClient::new(transport),
            variant,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// 解析を1回実行する
    ///
    /// 画像がなければ通信せずに Error::InputMissing。
    /// 呼び出しごとに新しいリクエストを発行し、前回の結果は使わない。
    pub async fn run(&self, image: Option<&UploadedImage>) -> Result<AttemptReport> {
        let image = image.ok_or(Error::InputMissing)?;
        let payload = encode_to_payload(image);

        tracing::debug!(
            file_name = %image.file_name,
            mime_type = %payload.mime_type,
            bytes = image.bytes.len(),
            "starting extraction"
        );
        let result = self.extract(&payload).await?;
        let mut report = AttemptReport::extracted(result);

        if !self.variant.explains() {
            return Ok(report);
        }

        match self.explain(&report.result).await {
            Ok(markup) => report.explanation = Some(markup),
            Err(e) => {
                tracing::warn!(error = %e, "explanation step failed; keeping extraction result");
                report.explanation_error = Some(e);
            }
        }

        Ok(report)
    }

    /// Step1: 抽出
    pub async fn extract(&self, payload: &EncodedImage) -> Result<ExtractionResult> {
        let request = build_extraction_request(EXTRACTION_PROMPT, payload);
        let text = self.client.generate(&request).await?;
        let result = parse_extraction_text(&text)?;
        tracing::debug!("extraction parsed");
        Ok(result)
    }

    /// Step2: 説明
    ///
    /// エラーはすべて Error::ExplanationUnavailable に変換して返す
    pub async fn explain(&self, result: &ExtractionResult) -> Result<Markup> {
        let prompt = build_explanation_prompt(result);
        let request = build_text_request(&prompt);

        let text = self.client.generate(&request).await.map_err(|e| match e {
            Error::MalformedResponse(detail) => Error::ExplanationUnavailable(detail),
            other => Error::ExplanationUnavailable(other.to_string()),
        })?;

        let markup = Markup::parse(&text);
        if markup.is_empty() {
            return Err(Error::ExplanationUnavailable(
                "the response contained no displayable text".to_string(),
            ));
        }
        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiRequest;
    use crate::testing::{candidate_body, MockTransport};
    use futures::executor::block_on;
    use serde_json::json;

    fn image() -> UploadedImage {
        UploadedImage::new(vec![0xff, 0xd8, 0xff, 0xe0], "image/jpeg", "report.jpg")
    }

    #[test]
    fn test_no_image_issues_no_calls() {
        let transport = MockTransport::new();
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractAndExplain);

        let err = block_on(orchestrator.run(None)).unwrap_err();
        assert!(matches!(err, Error::InputMissing));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_extract_only_success() {
        let transport = MockTransport::new()
            .reply(200, candidate_body(r#"{"patientInformation": {"name": "Jane Doe"}}"#));
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractOnly);

        let report = block_on(orchestrator.run(Some(&image()))).unwrap();
        assert_eq!(
            report.result.value(),
            &json!({"patientInformation": {"name": "Jane Doe"}})
        );
        assert!(report.explanation.is_none());
        assert!(report.explanation_error.is_none());
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_extraction_request_carries_image() {
        let transport = MockTransport::new().reply(200, candidate_body("{}"));
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractOnly);
        block_on(orchestrator.run(Some(&image()))).unwrap();

        let sent: GeminiRequest = serde_json::from_str(&transport.requests()[0]).unwrap();
        assert!(sent.has_inline_data());
        assert_eq!(sent.prompt_text(), Some(EXTRACTION_PROMPT));
        let value: serde_json::Value = serde_json::from_str(&transport.requests()[0]).unwrap();
        assert_eq!(value["contents"][0]["parts"][1]["inlineData"]["data"], "/9j/4A==");
        assert_eq!(value["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_http_500_is_transport_failure() {
        let transport = MockTransport::new().reply(500, "upstream exploded");
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractAndExplain);

        let err = block_on(orchestrator.run(Some(&image()))).unwrap_err();
        assert!(matches!(err, Error::Transport { status: 500, .. }));
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("upstream exploded"));
        // Step1失敗時はStep2を呼ばない
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_empty_candidates_is_malformed() {
        let transport = MockTransport::new().reply(200, r#"{"candidates": []}"#);
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractOnly);

        let err = block_on(orchestrator.run(Some(&image()))).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_non_json_text_is_malformed() {
        let transport = MockTransport::new().reply(200, candidate_body("I could not read the image"));
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractOnly);

        let err = block_on(orchestrator.run(Some(&image()))).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_network_error_propagates() {
        let transport = MockTransport::new().fail("connection refused");
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractOnly);

        let err = block_on(orchestrator.run(Some(&image()))).unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_explain_success() {
        let transport = MockTransport::new()
            .reply(200, candidate_body(r#"{"vitalSigns": {"pulse": 72}}"#))
            .reply(
                200,
                candidate_body("<ol><li>Pulse is normal</li><li>See your doctor</li></ol>"),
            );
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractAndExplain);

        let report = block_on(orchestrator.run(Some(&image()))).unwrap();
        let markup = report.explanation.expect("explanation");
        assert_eq!(
            markup.to_html(),
            "<ol><li>Pulse is normal</li><li>See your doctor</li></ol>"
        );
        assert!(report.explanation_error.is_none());

        let second: GeminiRequest = serde_json::from_str(&transport.requests()[1]).unwrap();
        assert!(!second.has_inline_data());
        assert!(second.generation_config.is_none());
        assert!(second.prompt_text().unwrap().contains("\"pulse\": 72"));
    }

    #[test]
    fn test_explain_empty_text_is_partial_success() {
        let transport = MockTransport::new()
            .reply(
                200,
                candidate_body(r#"{"patientInformation": {"name": "Jane Doe", "age": 42}}"#),
            )
            .reply(200, candidate_body(""));
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractAndExplain);

        let report = block_on(orchestrator.run(Some(&image()))).unwrap();
        assert_eq!(report.result.value()["patientInformation"]["age"], 42);
        assert!(report.explanation.is_none());
        let err = report.explanation_error.expect("summary error");
        assert!(matches!(err, Error::ExplanationUnavailable(_)));
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn test_explain_transport_failure_is_partial_success() {
        let transport = MockTransport::new()
            .reply(200, candidate_body(r#"{"medications": []}"#))
            .reply(429, "quota");
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractAndExplain);

        let report = block_on(orchestrator.run(Some(&image()))).unwrap();
        let message = report.explanation_error.unwrap().to_string();
        assert!(message.contains("summary"));
        assert!(message.contains("429"));
    }

    #[test]
    fn test_explain_script_only_is_partial_success() {
        let transport = MockTransport::new()
            .reply(200, candidate_body("{}"))
            .reply(200, candidate_body("<script>alert(1)</script>"));
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractAndExplain);

        let report = block_on(orchestrator.run(Some(&image()))).unwrap();
        assert!(report.explanation.is_none());
        assert!(report.explanation_error.is_some());
    }

    #[test]
    fn test_rerun_issues_fresh_calls() {
        let transport = MockTransport::new()
            .reply(200, candidate_body(r#"{"a": 1}"#))
            .reply(200, candidate_body(r#"{"b": 2}"#));
        let orchestrator = Orchestrator::new(&transport, Variant::ExtractOnly);
        let image = image();

        let first = block_on(orchestrator.run(Some(&image))).unwrap();
        let second = block_on(orchestrator.run(Some(&image))).unwrap();
        assert_eq!(first.result.value(), &json!({"a": 1}));
        assert_eq!(second.result.value(), &json!({"b": 2}));
        assert_eq!(transport.call_count(), 2);
    }
}
