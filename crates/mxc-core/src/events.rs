//! Console event types and the presentation port.
//!
//! The console never renders anything itself. Each state change is emitted
//! as a `ConsoleEvent` to a `Presenter`, which owns the actual output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
}

impl ChatEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Events emitted by the console as its state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleEvent {
    /// Raw text from the matrix worker root.
    ApiInfo { text: String },

    /// The context snapshot was replaced.
    ContextReplaced { snapshot: Value },

    /// An entry was appended to the chat log.
    ChatAppended { entry: ChatEntry },

    /// The code output region was replaced.
    CodeReplaced { code: String },

    /// A line was appended to the terminal log.
    TerminalAppended { line: String },

    /// Upload progress or completion message.
    UploadStatus { text: String },
}

/// Presentation port: receives every console event in emission order.
pub trait Presenter {
    fn present(&mut self, event: &ConsoleEvent);
}

impl<F> Presenter for F
where
    F: FnMut(&ConsoleEvent),
{
    fn present(&mut self, event: &ConsoleEvent) {
        self(event);
    }
}

/// Presenter that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<ConsoleEvent>,
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, event: &ConsoleEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ConsoleEvent::ChatAppended {
            entry: ChatEntry::assistant("hello"),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "chat_appended",
                "entry": { "role": "assistant", "content": "hello" }
            })
        );
    }

    #[test]
    fn test_closure_is_a_presenter() {
        let mut seen = Vec::new();
        {
            let mut sink = |event: &ConsoleEvent| seen.push(event.clone());
            sink.present(&ConsoleEvent::UploadStatus {
                text: "Processing...".to_string(),
            });
        }
        assert_eq!(seen.len(), 1);
    }
}
