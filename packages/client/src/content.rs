//! Rendering of a stored feedback record into ordered content items.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use feedback_collector_server::{
    domain::Language,
    infrastructure::dto::{http::FeedbackDataDto, websocket::ImagePayload},
};

use crate::{error::ImageDecodeError, i18n::catalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Format tag for a MIME type; anything unrecognised is treated as PNG
    pub fn from_mime(mime_type: &str) -> Self {
        let mime_type = mime_type.to_ascii_lowercase();
        if mime_type.contains("jpeg") || mime_type.contains("jpg") {
            ImageFormat::Jpeg
        } else if mime_type.contains("gif") {
            ImageFormat::Gif
        } else if mime_type.contains("webp") {
            ImageFormat::Webp
        } else {
            ImageFormat::Png
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Text(String),
    Image { data: Vec<u8>, format: ImageFormat },
}

impl ContentItem {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text(text) => Some(text),
            ContentItem::Image { .. } => None,
        }
    }
}

/// Decode base64 image data, dropping a `data:<mime>;base64,` header if present
pub fn decode_image_data(data: &str) -> Result<Vec<u8>, ImageDecodeError> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => {
            rest.split_once(',')
                .ok_or(ImageDecodeError::MissingPayload)?
                .1
        }
        None => data,
    };
    Ok(BASE64.decode(payload.trim())?)
}

/// Content of a `completed` record.
///
/// Order: text, then caption and bytes per image, then the auto-append prompt.
/// A broken image becomes an error item in place of its bytes.
pub fn render_completed(data: Option<&FeedbackDataDto>) -> Vec<ContentItem> {
    let default = FeedbackDataDto::default();
    let data = data.unwrap_or(&default);
    let language = data.language.unwrap_or_default();
    let texts = catalog(language);
    let mut items = Vec::new();

    if let Some(text) = data.text.as_deref().filter(|text| !text.is_empty()) {
        items.push(ContentItem::Text(format!(
            "{}{}",
            texts.text_feedback_prefix, text
        )));
    }

    for (index, image) in data.images.iter().flatten().enumerate() {
        render_image(&mut items, index + 1, image, language);
    }

    if items.is_empty() {
        items.push(ContentItem::Text(texts.empty_feedback.to_string()));
    }

    if data.auto_append.unwrap_or(true) {
        items.push(ContentItem::Text(texts.auto_append_prompt.to_string()));
    }

    items
}

fn render_image(items: &mut Vec<ContentItem>, number: usize, image: &ImagePayload, language: Language) {
    let texts = catalog(language);
    let name = if image.name.is_empty() {
        format!("image_{}", number)
    } else {
        image.name.clone()
    };
    items.push(ContentItem::Text(texts.image_caption(number, &name, image.size)));

    if image.data.is_empty() {
        return;
    }

    match decode_image_data(&image.data) {
        Ok(bytes) => {
            let format = ImageFormat::from_mime(&image.mime_type);
            tracing::debug!(
                "Decoded image {} as {} ({} bytes)",
                name,
                format.as_str(),
                bytes.len()
            );
            items.push(ContentItem::Image {
                data: bytes,
                format,
            });
        }
        Err(e) => {
            tracing::warn!("Failed to decode image {}: {}", name, e);
            items.push(ContentItem::Text(texts.image_failed(&name, &e.to_string())));
        }
    }
}

/// Content of a `cancelled` record
pub fn render_cancelled(reason: Option<&str>, language: Language) -> Vec<ContentItem> {
    let texts = catalog(language);
    let reason = reason
        .filter(|reason| !reason.is_empty())
        .unwrap_or(texts.default_cancel_reason);
    vec![ContentItem::Text(texts.cancelled(reason))]
}

/// Content of an `error` record
pub fn render_error(message: Option<&str>, language: Language) -> Vec<ContentItem> {
    let texts = catalog(language);
    let message = message
        .filter(|message| !message.is_empty())
        .unwrap_or(texts.default_error_message);
    vec![ContentItem::Text(texts.failed(message))]
}
