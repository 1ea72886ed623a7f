use crate::connection::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trait for getting the wire name of an event
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// Events a client sends over its connection.
///
/// Frames look like `{"event": "sendMessage", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChatEvent {
    #[serde(rename = "sendMessage")]
    Message {
        #[serde(rename = "message")]
        payload: Value,
        #[serde(rename = "recipientId", alias = "recepientId")]
        recipient: UserId,
    },

    #[serde(rename = "typing")]
    TypingStart {
        #[serde(rename = "chatSessionId")]
        session_id: String,
        #[serde(rename = "senderId")]
        sender: UserId,
        #[serde(rename = "recipientId", alias = "recepientId")]
        recipient: UserId,
    },

    #[serde(rename = "stopTyping")]
    TypingStop {
        #[serde(rename = "chatSessionId")]
        session_id: String,
        #[serde(rename = "senderId")]
        sender: UserId,
        #[serde(rename = "recipientId", alias = "recepientId")]
        recipient: UserId,
    },

    /// Someone was paired with a waiting stranger.
    #[serde(rename = "joinedRandomChat")]
    PairingNotice {
        #[serde(rename = "waitingUserId")]
        waiting: UserId,
        #[serde(rename = "chatSessionId")]
        session_id: String,
    },
}

impl EventType for ChatEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ChatEvent::Message { .. } => "sendMessage",
            ChatEvent::TypingStart { .. } => "typing",
            ChatEvent::TypingStop { .. } => "stopTyping",
            ChatEvent::PairingNotice { .. } => "joinedRandomChat",
        }
    }
}

/// Events the relay pushes to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    #[serde(rename = "receiveMessage")]
    ReceiveMessage { message: Value },

    #[serde(rename = "userTyping", rename_all = "camelCase")]
    UserTyping {
        sender_id: UserId,
        chat_session_id: String,
    },

    #[serde(rename = "userStoppedTyping", rename_all = "camelCase")]
    UserStoppedTyping {
        sender_id: UserId,
        chat_session_id: String,
    },

    #[serde(rename = "strangerConnected", rename_all = "camelCase")]
    StrangerConnected { chat_session_id: String },
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::ReceiveMessage { .. } => "receiveMessage",
            Event::UserTyping { .. } => "userTyping",
            Event::UserStoppedTyping { .. } => "userStoppedTyping",
            Event::StrangerConnected { .. } => "strangerConnected",
        }
    }
}
