//! 画像ペイロード処理
//!
//! - data URLの生成（プレビュー用）
//! - data URLからBase64部分・MIMEタイプの抽出
//! - API送信用のBase64エンコード

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};
use crate::types::{EncodedImage, UploadedImage};

/// ファイルピッカーで受け付けるMIMEタイプ
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// `<input accept=...>` 用の文字列
pub fn accept_attribute() -> String {
    ACCEPTED_MIME_TYPES.join(", ")
}

/// 拡張子からMIMEタイプを推定
pub fn mime_type_from_file_name(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// プレビュー表示用のdata URLを生成
pub fn to_data_url(image: &UploadedImage) -> String {
    format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.bytes))
}

/// API送信用ペイロードを生成
///
/// data URLから `data:<mime>;base64,` を除いた部分と同じ文字列になる
pub fn encode_to_payload(image: &UploadedImage) -> EncodedImage {
    EncodedImage {
        mime_type: image.mime_type.clone(),
        data: STANDARD.encode(&image.bytes),
    }
}

/// Base64ペイロードを元のバイト列に戻す
pub fn decode_payload(payload: &EncodedImage) -> Result<Vec<u8>> {
    STANDARD
        .decode(payload.data.as_bytes())
        .map_err(|e| Error::Encoding(format!("Invalid base64 payload: {}", e)))
}

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split_once(',').map(|(_, body)| body)
}

/// Data URLからMIMEタイプを抽出
///
/// 抽出できない場合は None
pub fn extract_mime_type_from_data_url(data_url: &str) -> Option<&str> {
    data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .filter(|mime| !mime.is_empty())
}

/// data URLを EncodedImage に変換（FileReader.readAsDataURL の結果を受ける）
pub fn payload_from_data_url(data_url: &str) -> Result<EncodedImage> {
    let data = extract_base64_from_data_url(data_url)
        .ok_or_else(|| Error::Encoding("Invalid data URL".to_string()))?;
    let mime_type = extract_mime_type_from_data_url(data_url).unwrap_or("application/octet-stream");

    Ok(EncodedImage {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}
