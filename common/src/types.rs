//! レポート解析の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - UploadedImage: 選択された画像（バイト列 + MIMEタイプ + ファイル名）
//! - EncodedImage: API送信用のBase64ペイロード
//! - ExtractionResult: Step1（抽出）の出力。スキーマなしのJSON文書
//! - Variant: 抽出のみ / 抽出 + 説明

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 選択された画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl UploadedImage {
    /// 宣言済みMIMEタイプが空ならファイル拡張子から補完する
    pub fn new(bytes: Vec<u8>, mime_type: &str, file_name: &str) -> Self {
        let mime_type = if mime_type.trim().is_empty() {
            crate::payload::mime_type_from_file_name(file_name).to_string()
        } else {
            mime_type.to_string()
        };

        Self {
            bytes,
            mime_type,
            file_name: file_name.to_string(),
        }
    }
}

/// Base64エンコード済みペイロード（data URLのプレフィックスなし）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

/// Step1の抽出結果
///
/// モデルが返したJSONをそのまま保持する。キー順は保持される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(Value);

impl ExtractionResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// 説明プロンプト埋め込み用の整形済みJSON
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<Value> for ExtractionResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// 解析モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Step1のみ
    #[default]
    ExtractOnly,
    /// Step1 → Step2（説明文生成）
    ExtractAndExplain,
}

impl Variant {
    pub fn from_explain_flag(explain: bool) -> Self {
        if explain {
            Variant::ExtractAndExplain
        } else {
            Variant::ExtractOnly
        }
    }

    pub fn explains(&self) -> bool {
        matches!(self, Variant::ExtractAndExplain)
    }
}
