//! fetch APIによる中継サーバ呼び出し
//!
//! 共通ライブラリの `Transport` をブラウザのfetchで実装する。
//! 送信先は中継エンドポイントのみで、APIキーはここには現れない。

use medreport_common::{Error, HttpReply, Result, Transport};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// 既定の中継エンドポイント（同一オリジン）
pub const DEFAULT_ENDPOINT: &str = "/api/generate";

/// エンドポイントを上書きする `<meta>` 名
pub const ENDPOINT_META_NAME: &str = "medreport-endpoint";

#[derive(Debug, Clone)]
pub struct FetchTransport {
    endpoint: String,
}

impl FetchTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// `<meta name="medreport-endpoint" content="...">` があればその値を使う
    pub fn from_document() -> Self {
        let endpoint = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| {
                d.query_selector(&format!("meta[name=\"{}\"]", ENDPOINT_META_NAME))
                    .ok()
                    .flatten()
            })
            .and_then(|meta| meta.get_attribute("content"))
            .filter(|content| !content.trim().is_empty());

        match endpoint {
            Some(endpoint) => Self::new(endpoint),
            None => Self::default(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for FetchTransport {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl Transport for FetchTransport {
    async fn post_json(&self, body: String) -> Result<HttpReply> {
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(&self.endpoint, &opts).map_err(network_error)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(network_error)?;

        let window = web_sys::window().ok_or_else(|| Error::Network("window is unavailable".into()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network_error)?;
        let resp: Response = resp_value.dyn_into().map_err(network_error)?;

        let text = JsFuture::from(resp.text().map_err(network_error)?)
            .await
            .map_err(network_error)?;

        if !resp.ok() {
            gloo::console::warn!(format!("relay returned {}", resp.status()));
        }

        Ok(HttpReply::new(resp.status(), text.as_string().unwrap_or_default()))
    }
}

/// fetchの失敗（オフライン、CORS拒否など）
fn network_error(value: JsValue) -> Error {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));
    Error::Network(message)
}
