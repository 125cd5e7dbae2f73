//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use medreport_ai::error::MedReportError;
use medreport_ai::upload;
use std::path::Path;
use tempfile::tempdir;

/// 存在しない画像を読み込んだ場合
#[test]
fn test_read_nonexistent_image() {
    let result = upload::read_image(Path::new("/nonexistent/path/12345.png"));
    assert!(matches!(result.unwrap_err(), MedReportError::FileNotFound(_)));
}

/// 空の画像ファイルはそのまま送信対象になる（検証しない）
#[test]
fn test_read_empty_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("empty.webp");
    std::fs::write(&path, b"").unwrap();

    let image = upload::read_image(&path).expect("empty file should be accepted");
    assert!(image.bytes.is_empty());
    assert_eq!(image.mime_type, "image/webp");
}

/// MedReportErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        MedReportError::Config("テスト設定エラー".to_string()),
        MedReportError::FileNotFound("report.jpg".to_string()),
        MedReportError::HttpClient("builder".to_string()),
        MedReportError::Server("bind".to_string()),
        MedReportError::MissingApiKey,
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty());
    }
}

/// 共通エラーはメッセージをそのまま表示する
#[test]
fn test_common_error_passthrough() {
    let err: MedReportError = medreport_common::Error::Transport {
        status: 500,
        body: "Internal".to_string(),
    }
    .into();
    assert_eq!(err.to_string(), "API error: 500. Details: Internal");

    let err: MedReportError = medreport_common::Error::InputMissing.into();
    assert_eq!(err.to_string(), "Please upload a medical report image first.");
}

/// APIキー未設定のメッセージに設定方法が含まれる
#[test]
fn test_missing_api_key_hint() {
    let display = MedReportError::MissingApiKey.to_string();
    assert!(display.contains("GEMINI_API_KEY"));
    assert!(display.contains("--set-api-key"));
}
