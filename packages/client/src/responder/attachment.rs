//! Image files attached from the terminal.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use feedback_collector_server::infrastructure::dto::websocket::ImagePayload;

use crate::{content::ImageFormat, error::ClientError};

/// Format by file extension; unknown extensions are sent as PNG
pub fn format_for_path(path: &Path) -> ImageFormat {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default();
    ImageFormat::from_mime(&format!("image/{}", extension))
}

/// Wrap raw bytes as a browser-style data URL payload
pub fn image_payload(name: String, bytes: &[u8], format: ImageFormat) -> ImagePayload {
    ImagePayload {
        name,
        size: bytes.len() as u64,
        mime_type: format.mime_type().to_string(),
        data: format!(
            "data:{};base64,{}",
            format.mime_type(),
            BASE64.encode(bytes)
        ),
    }
}

pub async fn load_image(path: &Path) -> Result<ImagePayload, ClientError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ClientError::ImageRead {
            path: path.display().to_string(),
            source,
        })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(image_payload(name, &bytes, format_for_path(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::decode_image_data;
    use std::path::PathBuf;

    #[test]
    fn test_format_for_path() {
        assert_eq!(format_for_path(Path::new("a.JPG")), ImageFormat::Jpeg);
        assert_eq!(format_for_path(Path::new("a.webp")), ImageFormat::Webp);
        assert_eq!(format_for_path(Path::new("noext")), ImageFormat::Png);
    }

    #[test]
    fn test_image_payload_is_decodable() {
        // テスト項目: 生成した data URL は描画側でそのまま復号できる
        // given (前提条件):
        let bytes = [0x89, b'P', b'N', b'G'];

        // when (操作):
        let payload = image_payload("shot.png".to_string(), &bytes, ImageFormat::Png);

        // then (期待する結果):
        assert_eq!(payload.size, 4);
        assert_eq!(payload.mime_type, "image/png");
        assert!(payload.data.starts_with("data:image/png;base64,"));
        assert_eq!(decode_image_data(&payload.data).unwrap(), bytes.to_vec());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_image(&PathBuf::from("/definitely/not/here.png")).await;
        assert!(matches!(result, Err(ClientError::ImageRead { .. })));
    }
}
