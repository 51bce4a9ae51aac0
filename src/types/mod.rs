// src/types/mod.rs - Chat events and feature error types shared across the bot

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core message type that flows from a platform connection into the command router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub platform: String,
    pub channel: String,
    pub username: String,
    pub display_name: Option<String>,
    pub content: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Moderator or channel owner, decided by the platform layer
    pub is_privileged: bool,
}

impl ChatMessage {
    pub fn new(channel: &str, username: &str, content: &str, is_privileged: bool) -> Self {
        Self {
            platform: "twitch".to_string(),
            channel: channel.to_string(),
            username: username.to_lowercase(),
            display_name: Some(username.to_string()),
            content: content.to_string(),
            timestamp: chrono::Utc::now(),
            is_privileged,
        }
    }

    /// Name shown in chat replies (display name when the platform sent one)
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// How a subscription was paid for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionPlan {
    Prime,
    Tier(String),
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionPlan::Prime => write!(f, "Prime"),
            SubscriptionPlan::Tier(name) => write!(f, "{}", name),
        }
    }
}

/// Everything a platform connection can hand to the bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatEvent {
    Message(ChatMessage),
    Cheer {
        channel: String,
        display_name: String,
        bits: u64,
        message: String,
    },
    Subscription {
        channel: String,
        display_name: String,
        plan: SubscriptionPlan,
    },
}

impl ChatEvent {
    pub fn channel(&self) -> &str {
        match self {
            ChatEvent::Message(message) => &message.channel,
            ChatEvent::Cheer { channel, .. } => channel,
            ChatEvent::Subscription { channel, .. } => channel,
        }
    }
}

/// Queue conflicts; the display text is what gets said in chat
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("{0} is already in the queue!")]
    AlreadyQueued(String),
    #[error("{0} is not in the queue!")]
    NotQueued(String),
    #[error("Queue is empty!")]
    Empty,
}

pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// Item list conflicts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("{0} is already in the meal list.")]
    Duplicate(String),
    #[error("{0} not found in meal list.")]
    NotFound(String),
}

pub type ListResult<T> = std::result::Result<T, ListError>;
