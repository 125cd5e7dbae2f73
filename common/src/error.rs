//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Please upload a medical report image first.")]
    InputMissing,

    #[error("{0}")]
    Encoding(String),

    #[error("API error: {status}. Details: {body}")]
    Transport { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not extract data. The AI response was empty or malformed. ({0})")]
    MalformedResponse(String),

    #[error("The plain-language summary could not be generated: {0}")]
    ExplanationUnavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// ユーザー向けの1行メッセージ
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
