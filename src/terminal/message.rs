//! Transcript entries.

use serde::{Deserialize, Serialize};

/// Tag carried by navigation markers. Front-ends never display it.
pub const QUICK_ACTIONS_TAG: &str = "quick-actions";

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Terminal output: boot lines, command results, errors.
    System,
    /// Echo of what the visitor typed.
    User,
    /// Text streamed back from the chat backend.
    Assistant,
    /// Marker asking the UI to render quick-action buttons.
    Navigation,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Navigation => "navigation",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single transcript entry. Entries are never edited once appended; the
/// streaming reply is grown by superseding the tail with a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(rename = "isLogo", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_logo: bool,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            is_logo: false,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// ASCII banner line. Rendered verbatim, without status styling.
    pub fn logo(content: impl Into<String>) -> Self {
        Self {
            is_logo: true,
            ..Self::new(Role::System, content)
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn navigation() -> Self {
        Self::new(Role::Navigation, QUICK_ACTIONS_TAG)
    }

    /// New assistant message carrying this one's content plus `fragment`.
    pub fn extended(&self, fragment: &str) -> Self {
        let mut content = String::with_capacity(self.content.len() + fragment.len());
        content.push_str(&self.content);
        content.push_str(fragment);
        Self {
            content,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Message::logo("BANNER")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["isLogo"], true);

        let json = serde_json::to_value(Message::user("ls")).unwrap();
        assert!(json.get("isLogo").is_none());

        let back: Message = serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(back, Message::assistant("hi"));
    }

    #[test]
    fn test_extended_leaves_original_untouched() {
        let first = Message::assistant("Hel");
        let second = first.extended("lo");
        assert_eq!(first.content, "Hel");
        assert_eq!(second.content, "Hello");
        assert_eq!(second.role, Role::Assistant);
    }
}
