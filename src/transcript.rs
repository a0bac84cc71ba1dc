//! Chat transcript owned by a single UI session.
//!
//! A [`Transcript`] is append-only and strictly alternates user and assistant
//! turns: every user turn is answered by exactly one assistant turn before the
//! next user turn is accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
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

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("the previous user turn has not been answered yet")]
    AwaitingReply,
    #[error("there is no user turn waiting for a reply")]
    NoPendingTurn,
    #[error("message {index} breaks user/assistant alternation")]
    OutOfOrder { index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChatMessage>", into = "Vec<ChatMessage>")]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), TranscriptError> {
        if self.awaiting_reply() {
            return Err(TranscriptError::AwaitingReply);
        }
        self.messages.push(ChatMessage::user(content));
        Ok(())
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> Result<(), TranscriptError> {
        if !self.awaiting_reply() {
            return Err(TranscriptError::NoPendingTurn);
        }
        self.messages.push(ChatMessage::assistant(content));
        Ok(())
    }

    /// True when the last turn is a user message that still needs an answer.
    pub fn awaiting_reply(&self) -> bool {
        matches!(self.messages.last(), Some(m) if m.role == Role::User)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl TryFrom<Vec<ChatMessage>> for Transcript {
    type Error = TranscriptError;

    fn try_from(messages: Vec<ChatMessage>) -> Result<Self, Self::Error> {
        for (index, message) in messages.iter().enumerate() {
            let expected = if index % 2 == 0 { Role::User } else { Role::Assistant };
            if message.role != expected {
                return Err(TranscriptError::OutOfOrder { index });
            }
        }
        Ok(Self { messages })
    }
}

impl From<Transcript> for Vec<ChatMessage> {
    fn from(transcript: Transcript) -> Self {
        transcript.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transcript_is_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert!(!transcript.awaiting_reply());
        assert!(transcript.last().is_none());
    }

    #[test]
    fn test_turns_alternate() {
        let mut transcript = Transcript::new();
        transcript.push_user("Hello").unwrap();
        assert!(transcript.awaiting_reply());
        transcript.push_assistant("Hi there!").unwrap();
        transcript.push_user("Show me Paris").unwrap();
        transcript.push_assistant("📍 **Paris** is at: ...").unwrap();

        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.messages()[0].role(), Role::User);
        assert_eq!(transcript.messages()[0].content(), "Hello");
        assert_eq!(transcript.messages()[1].role(), Role::Assistant);
        assert_eq!(transcript.messages()[3].content(), "📍 **Paris** is at: ...");
    }

    #[test]
    fn test_second_user_turn_rejected_until_answered() {
        let mut transcript = Transcript::new();
        transcript.push_user("first").unwrap();
        assert_eq!(transcript.push_user("second"), Err(TranscriptError::AwaitingReply));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_assistant_turn_needs_pending_user_turn() {
        let mut transcript = Transcript::new();
        assert_eq!(
            transcript.push_assistant("unprompted"),
            Err(TranscriptError::NoPendingTurn)
        );
    }

    #[test]
    fn test_serializes_as_plain_message_array() {
        let mut transcript = Transcript::new();
        transcript.push_user("Tell me a joke").unwrap();
        transcript.push_assistant("No.").unwrap();

        let json = serde_json::to_value(&transcript).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "content": "Tell me a joke"},
                {"role": "assistant", "content": "No."}
            ])
        );

        let back: Transcript = serde_json::from_value(json).unwrap();
        assert_eq!(back, transcript);
    }

    #[test]
    fn test_deserialize_rejects_out_of_order_turns() {
        let json = serde_json::json!([
            {"role": "assistant", "content": "I speak first"}
        ]);
        assert!(serde_json::from_value::<Transcript>(json).is_err());

        let json = serde_json::json!([
            {"role": "user", "content": "a"},
            {"role": "user", "content": "b"}
        ]);
        assert!(serde_json::from_value::<Transcript>(json).is_err());
    }
}
