//! Conversion logic between DTOs and domain entities.

use feedback_collector_shared::time::millis_to_rfc3339;

use crate::domain::{
    Connection, FeedbackOutcome, FeedbackRequest, FeedbackSubmission, ImageAttachment, Language,
};

use super::{
    http::{ConnectionDto, FeedbackDataDto, FeedbackRecordDto},
    websocket::{FeedbackSubmitPayload, ImagePayload},
};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<ImagePayload> for ImageAttachment {
    fn from(dto: ImagePayload) -> Self {
        Self {
            name: dto.name,
            size_bytes: dto.size,
            mime_type: dto.mime_type,
            data: dto.data,
        }
    }
}

impl From<FeedbackSubmitPayload> for FeedbackSubmission {
    /// Missing `auto_append` means `true`, missing `language` means `CN`.
    fn from(dto: FeedbackSubmitPayload) -> Self {
        Self {
            text: dto.text,
            images: dto
                .images
                .unwrap_or_default()
                .into_iter()
                .map(ImageAttachment::from)
                .collect(),
            auto_append: dto.auto_append.unwrap_or(true),
            language: dto.language.unwrap_or(Language::CN),
            submitted_at: dto.timestamp,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ImageAttachment> for ImagePayload {
    fn from(model: ImageAttachment) -> Self {
        Self {
            name: model.name,
            size: model.size_bytes,
            mime_type: model.mime_type,
            data: model.data,
        }
    }
}

impl From<FeedbackRequest> for FeedbackRecordDto {
    fn from(model: FeedbackRequest) -> Self {
        let status = model.status();
        let resolved_at = model.resolved_at().map(|at| millis_to_rfc3339(at.value()));
        let (data, message) = match model.outcome().cloned() {
            None => (None, None),
            Some(FeedbackOutcome::Completed(submission)) => (
                Some(FeedbackDataDto {
                    text: submission.text,
                    images: Some(
                        submission
                            .images
                            .into_iter()
                            .map(ImagePayload::from)
                            .collect(),
                    ),
                    auto_append: Some(submission.auto_append),
                    language: Some(submission.language),
                    reason: None,
                    timestamp: submission.submitted_at,
                }),
                None,
            ),
            Some(FeedbackOutcome::Cancelled {
                reason,
                cancelled_at,
            }) => (
                Some(FeedbackDataDto {
                    reason: Some(reason),
                    timestamp: cancelled_at,
                    ..FeedbackDataDto::default()
                }),
                None,
            ),
            Some(FeedbackOutcome::Error { message }) => (None, Some(message)),
        };

        Self {
            request_id: model.id.into_string(),
            status,
            created_at: Some(millis_to_rfc3339(model.created_at.value())),
            timeout: model.timeout_seconds,
            data,
            message,
            resolved_at,
        }
    }
}

impl From<Connection> for ConnectionDto {
    fn from(model: Connection) -> Self {
        Self {
            connection_id: model.id.to_string(),
            connected_at: millis_to_rfc3339(model.connected_at.value()),
            last_heartbeat: millis_to_rfc3339(model.last_heartbeat.value()),
            client_info: model.client_info,
        }
    }
}
