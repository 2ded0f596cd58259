//! Model-facing message history of one chat session.

use std::collections::HashSet;

use ai_llm_service::chat::{ChatMessage, ChatRole};

use crate::error::ConversationError;

/// Append-only message list replayed to the model on every turn.
///
/// Every tool-role message must answer a call id emitted by an earlier
/// assistant message, and each call id is answered at most once.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    open_calls: HashSet<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, msg: ChatMessage) -> Result<(), ConversationError> {
        self.append(vec![msg])
    }

    /// Appends all of `msgs` or none of them.
    pub fn append(&mut self, msgs: Vec<ChatMessage>) -> Result<(), ConversationError> {
        let mut open = self.open_calls.clone();
        for m in &msgs {
            check(&mut open, m)?;
        }
        self.open_calls = open;
        self.messages.extend(msgs);
        Ok(())
    }
}

fn check(open: &mut HashSet<String>, m: &ChatMessage) -> Result<(), ConversationError> {
    match m.role {
        ChatRole::Assistant => {
            open.extend(m.tool_calls.iter().map(|c| c.id.clone()));
        }
        ChatRole::Tool => {
            let id = m
                .tool_call_id
                .as_deref()
                .ok_or(ConversationError::MissingToolCallId)?;
            if !open.remove(id) {
                return Err(ConversationError::UnmatchedToolCall(id.to_string()));
            }
        }
        ChatRole::System | ChatRole::User => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ai_llm_service::chat::ToolCall;
    use serde_json::json;

    use super::*;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: "create_csv_visualization".into(),
            arguments: json!({}),
        }
    }

    #[test]
    fn tool_reply_must_follow_its_call() {
        let mut c = Conversation::new();
        assert_eq!(
            c.push(ChatMessage::tool("call_1", "done")),
            Err(ConversationError::UnmatchedToolCall("call_1".into()))
        );
        assert!(c.is_empty());

        c.append(vec![
            ChatMessage::user("chart it"),
            ChatMessage::assistant("", vec![call("call_1")]),
            ChatMessage::tool("call_1", "done"),
        ])
        .unwrap();
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn a_call_is_answered_once() {
        let mut c = Conversation::new();
        c.push(ChatMessage::assistant("", vec![call("a")])).unwrap();
        c.push(ChatMessage::tool("a", "ok")).unwrap();
        assert!(c.push(ChatMessage::tool("a", "again")).is_err());
    }

    #[test]
    fn failed_append_changes_nothing() {
        let mut c = Conversation::new();
        let mut orphan = ChatMessage::tool("x", "?");
        orphan.tool_call_id = None;
        let err = c.append(vec![ChatMessage::user("hi"), orphan]).unwrap_err();
        assert_eq!(err, ConversationError::MissingToolCallId);
        assert!(c.is_empty());
    }
}
