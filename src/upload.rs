//! 画像ファイルの読み込み（CLI側のアップロード）

use crate::error::{MedReportError, Result};
use medreport_common::payload::{mime_type_from_file_name, ACCEPTED_MIME_TYPES};
use medreport_common::UploadedImage;
use std::path::Path;

/// 画像ファイルを読み込む
///
/// 形式・サイズの検証はしない（未対応の拡張子は警告のみ）。
/// 読み込み失敗は EncodingFailure として返す。
pub fn read_image(path: &Path) -> Result<UploadedImage> {
    if !path.exists() {
        return Err(MedReportError::FileNotFound(path.display().to_string()));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mime_type = mime_type_from_file_name(&file_name);
    if !ACCEPTED_MIME_TYPES.contains(&mime_type) {
        tracing::warn!(file = %file_name, "not a PNG/JPEG/WEBP file; sending as-is");
    }

    let bytes = std::fs::read(path).map_err(|e| {
        medreport_common::Error::Encoding(format!("{}: {}", path.display(), e))
    })?;

    Ok(UploadedImage::new(bytes, mime_type, &file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_image_png() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("labs.png");
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let image = read_image(&path).unwrap();
        assert_eq!(image.file_name, "labs.png");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_read_image_unknown_extension_is_forwarded() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("scan.tiff");
        std::fs::write(&path, b"II*\0").unwrap();

        let image = read_image(&path).unwrap();
        assert_eq!(image.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_read_image_missing() {
        let result = read_image(Path::new("/nonexistent/report-12345.jpg"));
        assert!(matches!(result, Err(MedReportError::FileNotFound(_))));
    }

    #[test]
    fn test_read_image_directory_is_encoding_failure() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = read_image(dir.path());
        assert!(matches!(
            result,
            Err(MedReportError::Report(medreport_common::Error::Encoding(_)))
        ));
    }
}
