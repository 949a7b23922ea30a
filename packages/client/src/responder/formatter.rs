//! Message formatting for the terminal responder.

use feedback_collector_server::domain::Language;

use super::command::Draft;

const RULE: &str = "============================================================";

/// Message formatter for responder display
pub struct ResponderFormatter;

impl ResponderFormatter {
    pub fn format_connected(connection_id: &str) -> String {
        format!(
            "\nConnected as {}. Waiting for feedback requests (type /help for commands).\n",
            connection_id
        )
    }

    /// Format an incoming feedback request
    ///
    /// # Arguments
    ///
    /// * `request_id` - Request to answer
    /// * `timeout` - Seconds the caller will wait
    /// * `language` - Language the caller asked for
    /// * `queued` - Requests waiting, this one included
    pub fn format_request(request_id: &str, timeout: u64, language: Language, queued: usize) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!("Feedback requested: {}\n", request_id));
        output.push_str(&format!(
            "timeout {}s, language {}, {} request(s) waiting\n",
            timeout, language, queued
        ));
        output.push_str("Type your feedback, /image <path> to attach, /send or /cancel.\n");
        output.push_str(RULE);
        output.push('\n');
        output
    }

    pub fn format_received(request_id: &str) -> String {
        format!("\n✓ Feedback for {} accepted\n", request_id)
    }

    pub fn format_cancelled(request_id: &str) -> String {
        format!("\n✗ Request {} cancelled\n", request_id)
    }

    pub fn format_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    pub fn format_status(draft: &Draft) -> String {
        let current = draft
            .current()
            .map(|request| request.id.as_str())
            .unwrap_or("(none)");
        format!(
            "\nanswering: {}\nwaiting requests: {}\ndraft: {} line(s), {} image(s)\nauto-append: {}\n",
            current,
            draft.pending_count(),
            draft.line_count(),
            draft.image_count(),
            if draft.auto_append() { "on" } else { "off" }
        )
    }

    pub fn format_help() -> String {
        [
            "",
            "<text>          append a line to the answer",
            "/image <path>   attach an image file",
            "/send           submit the answer",
            "/cancel         cancel the current request",
            "/auto on|off    ask the agent to call back for more feedback",
            "/status         show the current draft",
            "/quit           leave",
            "",
        ]
        .join("\n")
    }
}
