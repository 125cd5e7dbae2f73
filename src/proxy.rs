//! APIキー中継サーバ
//!
//! ブラウザにAPIキーを渡さないため、フロントエンドは `/api/generate` へ
//! リクエスト本文をそのまま送り、このサーバがキーを付けてGeminiへ転送する。
//! 上流のステータスと本文は変更せずに返す。
//!
//! キーを消費できる口なので、CORSは明示的に許可したオリジンにのみ付ける。
//! 画像サイズは検証しないため、本文の上限は外している。

use crate::client::build_client;
use crate::config::Config;
use crate::error::{MedReportError, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// フロントエンドが叩くパス
pub const GENERATE_PATH: &str = "/api/generate";

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream_url: String,
    api_key: Arc<str>,
}

impl ProxyState {
    pub fn new(client: reqwest::Client, upstream_url: impl Into<String>, api_key: &str) -> Self {
        Self {
            client,
            upstream_url: upstream_url.into(),
            api_key: Arc::from(api_key),
        }
    }

    /// 設定から作成（APIキーがなければエラー）
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let client = build_client(config.timeout_seconds)?;
        Ok(Self::new(client, config.endpoint_url(), &api_key))
    }
}

/// 許可オリジンからCORSレイヤーを作る
///
/// 空なら None（同一オリジンのみ）
pub fn cors_layer(allow_origins: &[String]) -> Result<Option<CorsLayer>> {
    if allow_origins.is_empty() {
        return Ok(None);
    }

    let origins = allow_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|_| {
                MedReportError::Config(format!("許可オリジンが不正です: {}", origin))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    ))
}

pub fn router(state: ProxyState, static_dir: Option<&Path>, cors: Option<CorsLayer>) -> Router {
    let mut app = Router::new()
        .route(
            GENERATE_PATH,
            post(generate).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/health", get(|| async { "OK" }))
        .with_state(state);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

/// 中継サーバを起動
pub async fn serve(
    addr: SocketAddr,
    state: ProxyState,
    static_dir: Option<PathBuf>,
    allow_origins: &[String],
) -> Result<()> {
    let app = router(state, static_dir.as_deref(), cors_layer(allow_origins)?);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| MedReportError::Server(format!("{} にバインドできません: {}", addr, e)))?;
    info!("proxy listening on http://{}", listener.local_addr()?);
    if let Some(dir) = &static_dir {
        info!("serving static files from {}", dir.display());
    }
    if !allow_origins.is_empty() {
        info!(origins = ?allow_origins, "cross-origin requests allowed");
    }

    axum::serve(listener, app).await?;
    Ok(())
}

async fn generate(State(state): State<ProxyState>, body: String) -> Response {
    let upstream = state
        .client
        .post(&state.upstream_url)
        .query(&[("key", &*state.api_key)])
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await;

    let response = match upstream {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e.without_url(), "upstream request failed");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match response.text().await {
        Ok(text) => {
            if !status.is_success() {
                warn!(status = status.as_u16(), "upstream returned an error status");
            }
            (status, [(header::CONTENT_TYPE, "application/json")], text).into_response()
        }
        Err(e) => {
            warn!(error = %e.without_url(), "failed to read upstream body");
            (StatusCode::BAD_GATEWAY, "Failed to read upstream response").into_response()
        }
    }
}
