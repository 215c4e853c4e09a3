use crate::error::ConversationError;
use crate::traits::{ChatMessage, Role, ToolCall};
use std::collections::VecDeque;

/// Append-only message history of one session.
///
/// Tool results must answer the calls of the latest assistant message, one
/// each and in the order they were requested. Nothing else may be appended
/// while such calls are outstanding.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    pending: VecDeque<String>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
            pending: VecDeque::new(),
        }
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

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn pending_tool_calls(&self) -> usize {
        self.pending.len()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), ConversationError> {
        self.ensure_settled()?;
        self.messages.push(ChatMessage::user(content));
        Ok(())
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> Result<(), ConversationError> {
        self.ensure_settled()?;
        self.messages.push(ChatMessage::assistant(content));
        Ok(())
    }

    /// Records the model's tool-call request verbatim and opens one pending
    /// slot per call.
    pub fn push_tool_calls(
        &mut self,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Result<(), ConversationError> {
        self.ensure_settled()?;
        self.pending = tool_calls.iter().map(|c| c.id.clone()).collect();
        self.messages
            .push(ChatMessage::assistant_with_tool_calls(content, tool_calls));
        Ok(())
    }

    pub fn push_tool_result(
        &mut self,
        tool_call_id: &str,
        content: impl Into<String>,
    ) -> Result<(), ConversationError> {
        match self.pending.front() {
            None => return Err(ConversationError::OrphanToolResult(tool_call_id.to_string())),
            Some(expected) if expected != tool_call_id => {
                return Err(ConversationError::OutOfOrder {
                    expected: expected.clone(),
                    got: tool_call_id.to_string(),
                });
            }
            Some(_) => {}
        }

        self.pending.pop_front();
        self.messages
            .push(ChatMessage::tool_result(tool_call_id, content));
        Ok(())
    }

    /// Messages appended after the first `since` entries.
    pub fn tail(&self, since: usize) -> &[ChatMessage] {
        &self.messages[since.min(self.messages.len())..]
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    fn ensure_settled(&self) -> Result<(), ConversationError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(ConversationError::UnansweredToolCalls(self.pending.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calls() -> Vec<ToolCall> {
        vec![
            ToolCall::new("call_a", "add", r#"{"a":1,"b":2}"#),
            ToolCall::new("call_b", "multiply", r#"{"a":3,"b":4}"#),
        ]
    }

    #[test]
    fn starts_with_single_system_message() {
        let conv = Conversation::new("be helpful");
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.messages()[0].content_or_empty(), "be helpful");
    }

    #[test]
    fn tool_results_pair_in_request_order() {
        let mut conv = Conversation::new("sys");
        conv.push_user("what is 1+2 and 3*4?").unwrap();
        conv.push_tool_calls(None, calls()).unwrap();
        assert_eq!(conv.pending_tool_calls(), 2);

        conv.push_tool_result("call_a", "3").unwrap();
        conv.push_tool_result("call_b", "12").unwrap();
        conv.push_assistant("3 and 12").unwrap();

        assert_eq!(conv.len(), 6);
        assert_eq!(conv.count_role(Role::Tool), 2);
        assert_eq!(conv.messages()[3].tool_call_id.as_deref(), Some("call_a"));
        assert_eq!(conv.messages()[4].tool_call_id.as_deref(), Some("call_b"));
    }

    #[test]
    fn orphan_tool_results_are_refused() {
        let mut conv = Conversation::new("sys");
        let err = conv.push_tool_result("call_x", "1").unwrap_err();
        assert_eq!(err, ConversationError::OrphanToolResult("call_x".into()));
        assert_eq!(conv.len(), 1);
    }

    #[test]
    fn out_of_order_results_are_refused() {
        let mut conv = Conversation::new("sys");
        conv.push_tool_calls(None, calls()).unwrap();

        let err = conv.push_tool_result("call_b", "12").unwrap_err();
        assert!(matches!(err, ConversationError::OutOfOrder { .. }));
        assert_eq!(conv.pending_tool_calls(), 2);
    }

    #[test]
    fn cannot_move_on_with_unanswered_calls() {
        let mut conv = Conversation::new("sys");
        conv.push_tool_calls(Some("let me check".into()), calls()).unwrap();
        conv.push_tool_result("call_a", "3").unwrap();

        assert_eq!(
            conv.push_assistant("done"),
            Err(ConversationError::UnansweredToolCalls(1))
        );
        assert_eq!(
            conv.push_user("next"),
            Err(ConversationError::UnansweredToolCalls(1))
        );
    }

    #[test]
    fn results_from_an_older_request_are_orphans() {
        let mut conv = Conversation::new("sys");
        conv.push_tool_calls(None, vec![ToolCall::new("call_1", "add", "{}")])
            .unwrap();
        conv.push_tool_result("call_1", "x").unwrap();

        assert!(conv.push_tool_result("call_1", "again").is_err());
    }

    #[test]
    fn tail_returns_new_messages() {
        let mut conv = Conversation::new("sys");
        let start = conv.len();
        conv.push_user("hello").unwrap();
        conv.push_assistant("hi").unwrap();

        let tail = conv.tail(start);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].role, Role::User);
        assert!(conv.tail(99).is_empty());
    }
}
