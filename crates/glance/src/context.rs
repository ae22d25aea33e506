//! Conversation context handed to the language model.

use glanceconf::ImageDetail;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::media::VideoFrame;

/// Unique identifier for a context item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message role in conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// An image attached to a message.
#[derive(Debug, Clone)]
pub struct ImageContent {
    pub frame: VideoFrame,
    pub detail: ImageDetail,
}

#[derive(Debug, Clone)]
pub enum ChatContent {
    Text(String),
    Image(ImageContent),
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: Vec<ChatContent>,
}

impl ChatMessage {
    pub fn new(role: Role, content: Vec<ChatContent>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
        }
    }

    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self::new(role, vec![ChatContent::Text(text.into())])
    }

    /// Concatenated text parts, images skipped.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                ChatContent::Text(t) => Some(t.as_str()),
                ChatContent::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageContent> {
        self.content.iter().filter_map(|c| match c {
            ChatContent::Image(image) => Some(image),
            ChatContent::Text(_) => None,
        })
    }
}

/// Ordered conversation history.
///
/// Cloning is cheap for images: frames share their pixel buffers.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub items: Vec<ChatMessage>,
}

impl ChatContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: ChatMessage) -> &MessageId {
        self.items.push(message);
        // just pushed
        &self.items[self.items.len() - 1].id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// JSON rendering used as a generation's recorded input.
    ///
    /// Images are reduced to their dimensions and detail level.
    pub fn to_trace_input(&self) -> serde_json::Value {
        let items: Vec<_> = self
            .items
            .iter()
            .map(|message| {
                let content: Vec<_> = message
                    .content
                    .iter()
                    .map(|c| match c {
                        ChatContent::Text(text) => json!({"type": "text", "text": text}),
                        ChatContent::Image(image) => json!({
                            "type": "image",
                            "width": image.frame.width,
                            "height": image.frame.height,
                            "detail": image.detail.as_str(),
                        }),
                    })
                    .collect();
                json!({"role": message.role.as_str(), "content": content})
            })
            .collect();
        serde_json::Value::Array(items)
    }
}

/// Incremental piece of a streamed completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatChunk {
    pub id: String,
    pub delta: Option<ChatDelta>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatDelta {
    pub role: Option<Role>,
    pub content: Option<String>,
}

impl ChatChunk {
    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            delta: Some(ChatDelta {
                role: Some(Role::Assistant),
                content: Some(content.into()),
            }),
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.delta.as_ref()?.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_input_hides_pixels() {
        let mut ctx = ChatContext::new();
        ctx.add_message(ChatMessage::text(Role::System, "be brief"));
        ctx.add_message(ChatMessage::new(
            Role::User,
            vec![
                ChatContent::Text("look".to_string()),
                ChatContent::Image(ImageContent {
                    frame: VideoFrame::new(vec![0u8; 12], 640, 480),
                    detail: ImageDetail::High,
                }),
            ],
        ));

        let input = ctx.to_trace_input();
        assert_eq!(input[0]["role"], "system");
        assert_eq!(input[0]["content"][0]["text"], "be brief");
        assert_eq!(
            input[1]["content"][1],
            json!({"type": "image", "width": 640, "height": 480, "detail": "high"})
        );
    }

    #[test]
    fn test_text_content_skips_images() {
        let message = ChatMessage::new(
            Role::User,
            vec![
                ChatContent::Text("a".to_string()),
                ChatContent::Image(ImageContent {
                    frame: VideoFrame::new(vec![0u8; 4], 1, 1),
                    detail: ImageDetail::Low,
                }),
                ChatContent::Text("b".to_string()),
            ],
        );
        assert_eq!(message.text_content(), "a\nb");
        assert_eq!(message.images().count(), 1);
    }

    #[test]
    fn test_chunk_content() {
        assert_eq!(ChatChunk::text("c1", "hi").content(), Some("hi"));
        let empty = ChatChunk {
            id: "c2".to_string(),
            delta: None,
        };
        assert_eq!(empty.content(), None);
    }
}
