//! Input commands of the terminal responder and the answer being drafted.

use std::{collections::VecDeque, path::PathBuf, time::Duration};

use feedback_collector_server::{
    domain::Language,
    infrastructure::dto::websocket::{
        ClientMessage, FeedbackCancelPayload, FeedbackSubmitPayload, ImagePayload,
    },
};
use feedback_collector_shared::time::now_rfc3339;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A plain line, appended to the draft text
    Text(String),
    Image(PathBuf),
    Send,
    Cancel,
    AutoAppend(bool),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0} (type /help)")]
    Unknown(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("expected 'on' or 'off', got '{0}'")]
    InvalidSwitch(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Text(line.to_string()));
        };

        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };

        match name {
            "image" | "img" => {
                if argument.is_empty() {
                    return Err(CommandError::MissingArgument("/image"));
                }
                Ok(Command::Image(PathBuf::from(argument)))
            }
            "send" => Ok(Command::Send),
            "cancel" => Ok(Command::Cancel),
            "auto" => match argument {
                "on" => Ok(Command::AutoAppend(true)),
                "off" => Ok(Command::AutoAppend(false)),
                "" => Err(CommandError::MissingArgument("/auto")),
                other => Err(CommandError::InvalidSwitch(other.to_string())),
            },
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(format!("/{}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: String,
    /// Seconds the caller waits, counted from `received_at`
    pub timeout: u64,
    pub language: Language,
    pub received_at: Instant,
}

impl PendingRequest {
    pub fn new(id: impl Into<String>, timeout: u64, language: Language) -> Self {
        Self {
            id: id.into(),
            timeout,
            language,
            received_at: Instant::now(),
        }
    }

    /// The caller has stopped polling for this request at `now`
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.received_at) >= Duration::from_secs(self.timeout)
    }
}

/// Requests waiting for an answer, oldest first, and the answer in progress
/// for the oldest one
#[derive(Debug, Default)]
pub struct Draft {
    pending: VecDeque<PendingRequest>,
    lines: Vec<String>,
    images: Vec<ImagePayload>,
    auto_append: bool,
}

impl Draft {
    pub fn new(auto_append: bool) -> Self {
        Self {
            auto_append,
            ..Self::default()
        }
    }

    pub fn enqueue(&mut self, request: PendingRequest) {
        if self.pending.iter().any(|pending| pending.id == request.id) {
            return;
        }
        self.pending.push_back(request);
    }

    /// The request the draft answers: the oldest one the caller still waits for
    pub fn current(&self) -> Option<&PendingRequest> {
        let now = Instant::now();
        self.pending.iter().find(|request| !request.is_expired_at(now))
    }

    pub fn pending_count(&self) -> usize {
        let now = Instant::now();
        self.pending
            .iter()
            .filter(|request| !request.is_expired_at(now))
            .count()
    }

    /// Forget requests whose caller has timed out; returns their ids
    pub fn drop_expired(&mut self) -> Vec<String> {
        let now = Instant::now();
        let (expired, live): (VecDeque<_>, VecDeque<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|request| request.is_expired_at(now));
        self.pending = live;
        expired.into_iter().map(|request| request.id).collect()
    }

    pub fn push_line(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn add_image(&mut self, image: ImagePayload) {
        self.images.push(image);
    }

    pub fn set_auto_append(&mut self, enabled: bool) {
        self.auto_append = enabled;
    }

    pub fn auto_append(&self) -> bool {
        self.auto_append
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Submit the draft for the current request; `None` when nothing is pending
    pub fn take_submission(&mut self) -> Option<ClientMessage> {
        self.drop_expired();
        let request = self.pending.pop_front()?;
        let text = std::mem::take(&mut self.lines).join("\n");
        let images = std::mem::take(&mut self.images);

        Some(ClientMessage::FeedbackSubmit(FeedbackSubmitPayload {
            request_id: Some(request.id),
            text: (!text.is_empty()).then_some(text),
            images: (!images.is_empty()).then_some(images),
            auto_append: Some(self.auto_append),
            language: Some(request.language),
            timestamp: Some(now_rfc3339()),
        }))
    }

    /// Cancel the current request and discard the draft
    pub fn take_cancel(&mut self) -> Option<ClientMessage> {
        self.drop_expired();
        let request = self.pending.pop_front()?;
        self.lines.clear();
        self.images.clear();

        Some(ClientMessage::FeedbackCancel(FeedbackCancelPayload {
            request_id: Some(request.id),
            timestamp: Some(now_rfc3339()),
        }))
    }
}
