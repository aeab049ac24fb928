//! Append-only transcript container.

use super::message::{Message, Role};

/// Ordered transcript. The only mutations are append, full clear and
/// superseding the trailing assistant message while a reply streams in.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Supersede the trailing assistant message with a copy carrying
    /// `fragment` appended. Returns false (and changes nothing) when the tail
    /// is not an assistant message, e.g. after a `clear` mid-stream.
    pub fn extend_tail(&mut self, fragment: &str) -> bool {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => {
                *last = last.extended(fragment);
                true
            }
            _ => false,
        }
    }

    /// Drop the trailing assistant placeholder if nothing was streamed into it.
    pub fn discard_empty_tail(&mut self) -> bool {
        let empty_tail = matches!(
            self.messages.last(),
            Some(last) if last.role == Role::Assistant && last.content.is_empty()
        );
        if empty_tail {
            self.messages.pop();
        }
        empty_tail
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_tail_only_touches_assistant() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hi"));
        assert!(!transcript.extend_tail("x"));
        assert_eq!(transcript.messages()[0].content, "hi");

        transcript.push(Message::assistant(""));
        assert!(transcript.extend_tail("Hel"));
        assert!(transcript.extend_tail("lo"));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().content, "Hello");
    }

    #[test]
    fn test_discard_empty_tail() {
        let mut transcript = Transcript::new();
        transcript.push(Message::assistant(""));
        assert!(transcript.discard_empty_tail());
        assert!(transcript.is_empty());

        transcript.push(Message::assistant("partial"));
        assert!(!transcript.discard_empty_tail());
        assert_eq!(transcript.len(), 1);
    }
}
