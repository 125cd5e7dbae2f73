//! reqwestによるTransport実装
//!
//! - direct: Gemini APIへ直接（APIキーをクエリに付与）
//! - via_proxy: `medreport serve` の /api/generate 経由（キーは中継サーバ側）

use crate::config::Config;
use crate::error::{MedReportError, Result};
use medreport_common::{HttpReply, Transport};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl ReqwestTransport {
    /// Gemini APIへ直接送信する
    pub fn direct(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Ok(Self {
            client: build_client(config.timeout_seconds)?,
            url: config.endpoint_url(),
            api_key: Some(api_key),
        })
    }

    /// 中継サーバ経由で送信する
    pub fn via_proxy(url: &str, timeout_seconds: Option<u64>) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_seconds)?,
            url: url.to_string(),
            api_key: None,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

pub(crate) fn build_client(timeout_seconds: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| MedReportError::HttpClient(e.to_string()))
}

impl Transport for ReqwestTransport {
    async fn post_json(&self, body: String) -> medreport_common::Result<HttpReply> {
        let mut request = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| medreport_common::Error::Network(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| medreport_common::Error::Network(e.without_url().to_string()))?;

        tracing::debug!(status, bytes = body.len(), "generateContent responded");
        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_via_proxy_has_no_key() {
        let transport = ReqwestTransport::via_proxy("http://127.0.0.1:8787/api/generate", None).unwrap();
        assert_eq!(transport.url(), "http://127.0.0.1:8787/api/generate");
        assert!(transport.api_key.is_none());
    }

    #[test]
    fn test_direct_uses_configured_endpoint() {
        let config = Config {
            api_key: Some("k".into()),
            api_base: "http://localhost:1/v1beta".into(),
            model: "m".into(),
            ..Default::default()
        };
        // 環境変数が設定されていてもURLは変わらない
        let transport = ReqwestTransport::direct(&config).unwrap();
        assert_eq!(transport.url(), "http://localhost:1/v1beta/models/m:generateContent");
        assert!(transport.api_key.is_some());
    }
}
