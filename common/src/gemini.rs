//! Gemini API連携（ランタイム非依存部分）
//!
//! - リクエスト/レスポンスのワイヤ型
//! - Step1/Step2のリクエスト構築
//! - レスポンスからのテキスト抽出
//! - Transport トレイト（fetch / reqwest / テスト用モックで実装）

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::EncodedImage;

/// APIベースURL
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 既定モデル
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// JSONモード指定
pub const JSON_MIME_TYPE: &str = "application/json";

/// `{api_base}/models/{model}:generateContent`（キーは含めない）
pub fn generate_content_url(api_base: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        model
    )
}

/// Gemini APIリクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

impl GeminiRequest {
    /// 画像を含むか
    pub fn has_inline_data(&self) -> bool {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .any(|p| matches!(p, Part::InlineData { .. }))
    }

    /// 先頭のテキストパート
    pub fn prompt_text(&self) -> Option<&str> {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .find_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
    }
}

/// Gemini APIレスポンス
///
/// 形状の欠落は MalformedResponse として扱うため、全フィールドを省略可能にしている
#[derive(Debug, Default, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Step1リクエスト（プロンプト + 画像、JSONモード）
pub fn build_extraction_request(prompt: &str, image: &EncodedImage) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text {
                    text: prompt.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
            ],
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: JSON_MIME_TYPE.to_string(),
        }),
    }
}

/// Step2リクエスト（テキストのみ、JSONモードなし）
pub fn build_text_request(prompt: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![Part::Text {
                text: prompt.to_string(),
            }],
        }],
        generation_config: None,
    }
}

/// レスポンス本文から candidates[0].content.parts[0].text を取り出す
pub fn extract_response_text(body: &str) -> Result<String> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("response body is not JSON: {}", e)))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse("no candidates".to_string()))?;

    let content = candidate
        .content
        .ok_or_else(|| Error::MalformedResponse("candidate has no content".to_string()))?;

    let text = content
        .parts
        .into_iter()
        .next()
        .and_then(|p| p.text)
        .ok_or_else(|| Error::MalformedResponse("no text part".to_string()))?;

    if text.trim().is_empty() {
        return Err(Error::MalformedResponse("empty text".to_string()));
    }

    Ok(text)
}

/// HTTP応答（ステータス + 本文テキスト）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// generateContent エンドポイントへのPOST
///
/// 送信自体に失敗した場合のみ Err（Error::Network）。非2xxは HttpReply で返す。
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post_json(&self, body: String) -> Result<HttpReply>;
}

impl<T: Transport> Transport for &T {
    async fn post_json(&self, body: String) -> Result<HttpReply> {
        (**self).post_json(body).await
    }
}

/// Gemini API呼び出し（共通処理）
#[derive(Debug, Clone)]
pub struct GeminiClient<T> {
    transport: T,
}

impl<T: Transport> GeminiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// リクエストを送信し、先頭候補のテキストを返す
    pub async fn generate(&self, request: &GeminiRequest) -> Result<String> {
        let body = serde_json::to_string(request)?;
        let reply = self.transport.post_json(body).await?;

        if !reply.is_success() {
            tracing::warn!(status = reply.status, "generateContent returned an error status");
            return Err(Error::Transport {
                status: reply.status,
                body: reply.body,
            });
        }

        extract_response_text(&reply.body)
    }
}
