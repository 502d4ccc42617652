use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text { text: String },
    Image { url: String, caption: String },
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        MessageContent::Image {
            url: url.into(),
            caption: String::new(),
        }
    }

    /// Short text used for the group's `lastMessage` summary.
    pub fn preview(&self) -> String {
        match self {
            MessageContent::Text { text } => text.clone(),
            MessageContent::Image { caption, .. } if !caption.is_empty() => caption.clone(),
            MessageContent::Image { .. } => "[image]".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAuthor {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
}

impl MessageAuthor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id.into()),
            name: name.into(),
            avatar: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub author: MessageAuthor,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMessage {
    pub id: MessageId,
    pub author: MessageAuthor,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
    pub is_pinned: bool,
    pub reactions: BTreeMap<String, Vec<UserId>>,
}

/// Read-side ordering: pinned messages first, each partition in timestamp
/// order. The sort is stable so equal timestamps keep insertion order.
pub fn pinned_first(mut messages: Vec<GroupMessage>) -> Vec<GroupMessage> {
    messages.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });
    messages
}
