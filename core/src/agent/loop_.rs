use crate::agent::{Conversation, ToolExecutor, ToolOutcome};
use crate::error::TurnError;
use crate::traits::{ChatRequest, ChatResponse, Provider, ToolSpec};
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    AwaitingUserInput,
    ModelRequested,
    ToolCallsPending,
    ToolsExecuting,
    FollowUpRequested,
    ResponseReady,
}

/// What one turn produced, for display.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub reply: String,
    pub tool_runs: Vec<ToolOutcome>,
    pub model_requests: usize,
}

impl TurnReport {
    pub fn used_tools(&self) -> bool {
        !self.tool_runs.is_empty()
    }
}

/// Drives one session: user text in, model reply out, running any
/// requested tools in between. Tool calls never recurse: after they run,
/// exactly one follow-up request is made with no tools on offer.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    executor: ToolExecutor,
    conversation: Conversation,
    max_completion_tokens: Option<u32>,
    state: DispatchState,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        executor: ToolExecutor,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            executor,
            conversation: Conversation::new(system_prompt),
            max_completion_tokens: None,
            state: DispatchState::AwaitingUserInput,
        }
    }

    pub fn with_max_completion_tokens(mut self, max: u32) -> Self {
        self.max_completion_tokens = Some(max);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Runs one turn. Blank input is ignored and returns `Ok(None)`.
    ///
    /// A provider failure ends the turn with an error; whatever was appended
    /// before the failing request stays, nothing is appended for it, and the
    /// loop is ready for the next input.
    pub async fn process(&mut self, input: &str) -> Result<Option<TurnReport>, TurnError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let result = self.run_turn(input).await;
        self.transition(DispatchState::AwaitingUserInput);

        match result {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                error!("Turn failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_turn(&mut self, input: &str) -> Result<TurnReport, TurnError> {
        self.conversation.push_user(input)?;

        self.transition(DispatchState::ModelRequested);
        let specs = self.executor.registry().specs();
        let response = self.request(&specs).await?;
        let mut model_requests = 1;
        let mut tool_runs = Vec::new();

        let reply = if response.has_tool_calls() {
            self.transition(DispatchState::ToolCallsPending);
            let calls = response.tool_calls;
            self.conversation
                .push_tool_calls(response.text, calls.clone())?;

            self.transition(DispatchState::ToolsExecuting);
            for call in &calls {
                let outcome = self.executor.run(call).await;
                self.conversation
                    .push_tool_result(&call.id, outcome.output.clone())?;
                tool_runs.push(outcome);
            }

            self.transition(DispatchState::FollowUpRequested);
            let follow_up = self.request(&[]).await?;
            model_requests += 1;
            if follow_up.has_tool_calls() {
                warn!(
                    count = follow_up.tool_calls.len(),
                    "Ignoring tool calls in follow-up response"
                );
            }
            follow_up.text.unwrap_or_default()
        } else {
            response.text.unwrap_or_default()
        };

        self.transition(DispatchState::ResponseReady);
        self.conversation.push_assistant(reply.clone())?;

        Ok(TurnReport {
            reply,
            tool_runs,
            model_requests,
        })
    }

    async fn request(&self, tools: &[ToolSpec]) -> Result<ChatResponse, TurnError> {
        let mut request = ChatRequest::new(self.conversation.messages()).with_tools(tools);
        if let Some(max) = self.max_completion_tokens {
            request = request.with_max_completion_tokens(max);
        }

        debug!(
            messages = self.conversation.len(),
            tools = tools.len(),
            model = self.provider.model(),
            "Requesting completion"
        );
        Ok(self.provider.chat(request).await?)
    }

    fn transition(&mut self, next: DispatchState) {
        debug!(from = ?self.state, to = ?next, "Dispatch transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ToolRegistry;
    use crate::error::{ProviderError, ToolError};
    use crate::testing::ScriptedProvider;
    use crate::tools::arithmetic_registry;
    use crate::traits::{ChatMessage, Role, ToolCall, ToolChoice};

    const SYSTEM: &str = "You are a helpful assistant with access to arithmetic functions.";

    fn agent(provider: Arc<ScriptedProvider>) -> AgentLoop {
        let executor = ToolExecutor::new(Arc::new(arithmetic_registry().unwrap()));
        AgentLoop::new(provider, executor, SYSTEM).with_max_completion_tokens(500)
    }

    /// Every tool message answers, in order, a call of the nearest preceding
    /// assistant message, and every such call is answered.
    fn assert_tool_pairing(messages: &[ChatMessage]) {
        let mut i = 0;
        while i < messages.len() {
            let msg = &messages[i];
            assert!(
                msg.role != Role::Tool,
                "tool message at {} without a preceding request",
                i
            );
            if msg.role == Role::Assistant && !msg.tool_calls.is_empty() {
                for (offset, call) in msg.tool_calls.iter().enumerate() {
                    let answer = &messages[i + 1 + offset];
                    assert_eq!(answer.role, Role::Tool);
                    assert_eq!(answer.tool_call_id.as_deref(), Some(call.id.as_str()));
                }
                i += msg.tool_calls.len();
            }
            i += 1;
        }
    }

    #[tokio::test]
    async fn plain_reply_uses_a_single_request() {
        let provider = Arc::new(ScriptedProvider::new().reply("Hello there!"));
        let mut agent = agent(provider.clone());

        let report = agent.process("hi").await.unwrap().unwrap();

        assert_eq!(report.reply, "Hello there!");
        assert_eq!(report.model_requests, 1);
        assert!(!report.used_tools());
        assert_eq!(provider.request_count(), 1);
        assert_eq!(agent.conversation().len(), 3);

        let request = &provider.requests()[0];
        assert_eq!(
            request.tool_names.as_deref(),
            Some(&["add", "subtract", "multiply", "divide"].map(String::from)[..])
        );
        assert_eq!(request.tool_choice, Some(ToolChoice::Auto));
        assert_eq!(request.max_completion_tokens, Some(500));
    }

    #[tokio::test]
    async fn addition_round_trip_appends_four_messages() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .call_tools(vec![ToolCall::new("call_1", "add", r#"{"a":15,"b":7}"#)])
                .reply("15 + 7 = 22"),
        );
        let mut agent = agent(provider.clone());

        let report = agent.process("What is 15 + 7?").await.unwrap().unwrap();

        assert!(report.reply.contains("22"));
        assert_eq!(report.tool_runs.len(), 1);
        assert_eq!(report.tool_runs[0].output, "22");
        assert_eq!(report.model_requests, 2);

        let new = agent.conversation().tail(1);
        assert_eq!(new.len(), 4);
        assert_eq!(new[0], ChatMessage::user("What is 15 + 7?"));
        assert_eq!(new[1].role, Role::Assistant);
        assert_eq!(new[1].tool_calls.len(), 1);
        assert_eq!(new[1].content, None);
        assert_eq!(new[2], ChatMessage::tool_result("call_1", "22"));
        assert_eq!(new[3], ChatMessage::assistant("15 + 7 = 22"));
        assert_tool_pairing(agent.conversation().messages());
    }

    #[tokio::test]
    async fn follow_up_offers_no_tools_and_sees_results() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .call_tools(vec![ToolCall::new("call_1", "divide", r#"{"a":100,"b":4}"#)])
                .reply("100 divided by 4 is 25."),
        );
        let mut agent = agent(provider.clone());
        agent.process("Calculate 100 divided by 4").await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].tool_names.is_none());
        assert!(requests[1].tool_choice.is_none());

        let last = requests[1].messages.last().unwrap();
        assert_eq!(last.role, Role::Tool);
        assert_eq!(last.content.as_deref(), Some("25.0"));
    }

    #[tokio::test]
    async fn many_calls_run_in_order_with_one_follow_up() {
        let calls = vec![
            ToolCall::new("c1", "multiply", r#"{"a":6,"b":7}"#),
            ToolCall::new("c2", "subtract", r#"{"a":10,"b":4}"#),
            ToolCall::new("c3", "add", r#"{"a":0.5,"b":0.25}"#),
        ];
        let provider = Arc::new(
            ScriptedProvider::new()
                .call_tools(calls.clone())
                .reply("42, 6 and 0.75"),
        );
        let mut agent = agent(provider.clone());

        let report = agent.process("do three things").await.unwrap().unwrap();

        let outputs: Vec<_> = report.tool_runs.iter().map(|r| r.output.as_str()).collect();
        assert_eq!(outputs, vec!["42", "6", "0.75"]);
        let ids: Vec<_> = report.tool_runs.iter().map(|r| r.call.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert_eq!(provider.request_count(), 2);
        assert_eq!(agent.conversation().count_role(Role::Tool), 3);
        assert_tool_pairing(agent.conversation().messages());
    }

    #[tokio::test]
    async fn tool_errors_become_conversation_content() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .call_tools(vec![
                    ToolCall::new("c1", "modulo", r#"{"a":7,"b":2}"#),
                    ToolCall::new("c2", "divide", r#"{"a":7,"b":0}"#),
                    ToolCall::new("c3", "add", "not json"),
                ])
                .reply("None of those worked."),
        );
        let mut agent = agent(provider.clone());

        let report = agent.process("break things").await.unwrap().unwrap();

        assert_eq!(report.reply, "None of those worked.");
        assert_eq!(
            report.tool_runs[0].error,
            Some(ToolError::UnknownTool("modulo".into()))
        );
        assert_eq!(report.tool_runs[1].output, "Error: Division by zero");
        assert!(matches!(
            report.tool_runs[2].error,
            Some(ToolError::MalformedArguments { .. })
        ));
        assert_eq!(provider.request_count(), 2);
        assert_tool_pairing(agent.conversation().messages());
    }

    #[tokio::test]
    async fn transport_failure_aborts_only_the_turn() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .fail(ProviderError::Api {
                    status: 503,
                    body: "overloaded".into(),
                })
                .reply("back online"),
        );
        let mut agent = agent(provider.clone());

        let err = agent.process("first").await.unwrap_err();
        assert!(matches!(err, TurnError::Transport(ProviderError::Api { status: 503, .. })));
        assert_eq!(agent.state(), DispatchState::AwaitingUserInput);
        assert_eq!(agent.conversation().count_role(Role::Assistant), 0);

        let report = agent.process("second").await.unwrap().unwrap();
        assert_eq!(report.reply, "back online");
        assert_eq!(agent.conversation().last().unwrap().role, Role::Assistant);
    }

    #[tokio::test]
    async fn failed_follow_up_leaves_tool_results_paired() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .call_tools(vec![ToolCall::new("c1", "add", r#"{"a":1,"b":1}"#)])
                .fail(ProviderError::NoChoices)
                .reply("ok"),
        );
        let mut agent = agent(provider.clone());

        assert!(agent.process("1+1").await.is_err());
        assert_eq!(agent.conversation().pending_tool_calls(), 0);
        assert_eq!(agent.conversation().last().unwrap().role, Role::Tool);
        assert_tool_pairing(agent.conversation().messages());

        assert!(agent.process("try again").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut agent = agent(provider.clone());

        assert!(agent.process("   ").await.unwrap().is_none());
        assert_eq!(provider.request_count(), 0);
        assert_eq!(agent.conversation().len(), 1);
    }

    #[tokio::test]
    async fn empty_registry_sends_no_tools() {
        let provider = Arc::new(ScriptedProvider::new().reply("Hi!"));
        let executor = ToolExecutor::new(Arc::new(ToolRegistry::new()));
        let mut agent = AgentLoop::new(provider.clone(), executor, "Be concise and friendly.");

        agent.process("hello").await.unwrap();

        let request = &provider.requests()[0];
        assert!(request.tool_names.is_none());
        assert!(request.tool_choice.is_none());
        assert!(request.max_completion_tokens.is_none());
    }

    #[tokio::test]
    async fn history_carries_across_turns() {
        let provider = Arc::new(ScriptedProvider::new().reply("one").reply("two"));
        let mut agent = agent(provider.clone());

        agent.process("first").await.unwrap();
        agent.process("second").await.unwrap();

        let second = &provider.requests()[1];
        assert_eq!(second.messages.len(), 4);
        assert_eq!(second.messages[2], ChatMessage::assistant("one"));
        assert_eq!(agent.conversation().len(), 5);
    }
}
