//! Inbound types at the orchestrator boundary: what the user said, and what
//! the model replied.

use tensive_core::{Error, Message, MessageToolCall};

/// Query used for retrieval when the user sends only an image.
pub const IMAGE_ONLY_QUERY: &str = "Analyze this image";

/// A user turn with text, an image reference, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: Option<String>,
    image: Option<String>,
}

impl Utterance {
    /// Blank text counts as absent. Fails when neither text nor image remain.
    pub fn new(text: Option<String>, image: Option<String>) -> Result<Self, Error> {
        let text = text.filter(|t| !t.trim().is_empty());
        let image = image.filter(|i| !i.trim().is_empty());
        if text.is_none() && image.is_none() {
            return Err(Error::EmptyUtterance);
        }
        Ok(Self { text, image })
    }

    pub fn text(text: impl Into<String>) -> Result<Self, Error> {
        Self::new(Some(text.into()), None)
    }

    pub fn with_image(text: Option<String>, image: impl Into<String>) -> Result<Self, Error> {
        Self::new(text, Some(image.into()))
    }

    /// The text retrieval runs against.
    pub fn query(&self) -> &str {
        self.text.as_deref().unwrap_or(IMAGE_ONLY_QUERY)
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// The history turn for this utterance. An image-only turn carries
    /// [`IMAGE_ONLY_QUERY`] as its text.
    pub fn to_message(&self) -> Message {
        let text = self.query().to_string();
        match &self.image {
            Some(image) => Message::user_with_image(text, image.clone()),
            None => Message::user(text),
        }
    }
}

/// The model's reply, reduced to the two shapes the orchestrator acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    PlainText(String),

    /// The first tool call in the reply. `ignored` counts any further calls,
    /// which are never executed.
    ToolInvocation {
        call: MessageToolCall,
        content: String,
        ignored: usize,
    },
}

impl From<&Message> for ModelReply {
    fn from(message: &Message) -> Self {
        let mut calls = message.tool_calls.iter();
        match calls.next() {
            Some(first) => Self::ToolInvocation {
                call: first.clone(),
                content: message.content.clone(),
                ignored: calls.len(),
            },
            None => Self::PlainText(message.content.clone()),
        }
    }
}
