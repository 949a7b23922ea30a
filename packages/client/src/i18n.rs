//! Caller-facing phrases in both supported languages.

use feedback_collector_server::domain::Language;

pub struct Catalog {
    pub text_feedback_prefix: &'static str,
    pub empty_feedback: &'static str,
    pub auto_append_prompt: &'static str,
    pub default_cancel_reason: &'static str,
    pub default_error_message: &'static str,
    pub timed_out: &'static str,
    image_caption: fn(usize, &str, u64) -> String,
    image_failed: fn(&str, &str) -> String,
    cancelled: fn(&str) -> String,
    failed: fn(&str) -> String,
    unreachable: fn(&str, &str) -> String,
}

impl Catalog {
    /// Caption for the `index`-th image, counting from 1
    pub fn image_caption(&self, index: usize, name: &str, size: u64) -> String {
        (self.image_caption)(index, name, size)
    }

    pub fn image_failed(&self, name: &str, error: &str) -> String {
        (self.image_failed)(name, error)
    }

    pub fn cancelled(&self, reason: &str) -> String {
        (self.cancelled)(reason)
    }

    pub fn failed(&self, message: &str) -> String {
        (self.failed)(message)
    }

    pub fn unreachable(&self, endpoint: &str, error: &str) -> String {
        (self.unreachable)(endpoint, error)
    }
}

static EN: Catalog = Catalog {
    text_feedback_prefix: "User text feedback: ",
    empty_feedback: "User submitted empty feedback",
    auto_append_prompt: "\n\nPlease keep two things in mind:\n\
        1. Address (or answer) the user feedback above.\n\
        2. Once that is done, call collect_feedback again to ask the user for further feedback.",
    default_cancel_reason: "user cancelled",
    default_error_message: "feedback processing failed",
    timed_out: "Feedback collection timed out, please try again",
    image_caption: |index, name, size| format!("Image {}: {} ({} bytes)", index, name, size),
    image_failed: |name, error| format!("Image processing failed: {} - {}", name, error),
    cancelled: |reason| format!("Feedback collection cancelled: {}", reason),
    failed: |message| format!("Feedback collection failed: {}", message),
    unreachable: |endpoint, error| {
        format!(
            "Could not reach the feedback server at {}: {}. Make sure it is running.",
            endpoint, error
        )
    },
};

static CN: Catalog = Catalog {
    text_feedback_prefix: "用户文字反馈：",
    empty_feedback: "用户提交了空反馈",
    auto_append_prompt: "\n\n请注意以下 2 点：\n\
        1. 处理（或回答）以上用户反馈。\n\
        2. 处理完成后，再次调用 collect_feedback 获取用户的后续反馈。",
    default_cancel_reason: "用户取消",
    default_error_message: "反馈处理出错",
    timed_out: "反馈收集超时，请重试",
    image_caption: |index, name, size| format!("图片{}: {} ({} bytes)", index, name, size),
    image_failed: |name, error| format!("图片处理失败: {} - {}", name, error),
    cancelled: |reason| format!("反馈收集已取消: {}", reason),
    failed: |message| format!("反馈收集失败: {}", message),
    unreachable: |endpoint, error| {
        format!("连接 Web 服务器失败: {}。请确保 Web 服务器正在运行在 {}", error, endpoint)
    },
};

pub fn catalog(language: Language) -> &'static Catalog {
    match language {
        Language::EN => &EN,
        Language::CN => &CN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captions_per_language() {
        assert_eq!(
            catalog(Language::EN).image_caption(1, "a.png", 100),
            "Image 1: a.png (100 bytes)"
        );
        assert_eq!(
            catalog(Language::CN).image_caption(2, "b.png", 7),
            "图片2: b.png (7 bytes)"
        );
    }

    #[test]
    fn test_outcome_phrases() {
        let en = catalog(Language::EN);
        assert_eq!(en.cancelled("user cancelled"), "Feedback collection cancelled: user cancelled");
        assert_eq!(en.failed("boom"), "Feedback collection failed: boom");
    }
}
