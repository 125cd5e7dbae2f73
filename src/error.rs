use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedReportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`medreport config --set-api-key YOUR_KEY` または環境変数 GEMINI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    Report(#[from] medreport_common::Error),

    #[error("HTTPクライアントエラー: {0}")]
    HttpClient(String),

    #[error("サーバエラー: {0}")]
    Server(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MedReportError>;
