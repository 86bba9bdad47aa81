//! Turn orchestrator
//!
//! Drives one conversational turn: rounds of (model call -> tool calls ->
//! tool results) until the model stops proposing tools, the round budget
//! runs out, or an approval-gated call pauses the turn. Events are pushed
//! through an [`EventStream`]; the caller owns transport concerns.
//!
//! Tool calls within a batch run one at a time, in the order the model
//! emitted them. Side effects like ATS updates are ordering-sensitive, so
//! sequential execution is a correctness choice here, not a shortcut.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;

use crate::agents::continuation::{Continuation, TurnParams};
use crate::agents::domain::{
    AgentKind, EventSender, EventStream, Message, StepStatus, StreamEvent, ToolCall,
};
use crate::agents::error::AgentError;
use crate::agents::instructions::{disclaimer_for, instructions_for};
use crate::agents::llm::{CompletionRequest, LlmProvider, ToolCallAccumulator};
use crate::agents::tools::{self, ToolContext};

/// Fallback text when a turn ends with nothing to say; distinguishes a
/// clean-but-empty stream from a hung one.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str =
    "I wasn't able to generate a response for this request. Please try again or rephrase.";

/// Orchestrates turns against a generation capability.
pub struct TurnOrchestrator {
    llm: Option<Arc<dyn LlmProvider>>,
    max_rounds: u32,
}

impl TurnOrchestrator {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>, max_rounds: u32) -> Self {
        Self { llm, max_rounds }
    }

    /// Start a new turn. `messages` is the transcript so far (history plus
    /// the new user message); agent instructions are prepended per round.
    pub fn run(&self, agent: AgentKind, messages: Vec<Message>, params: TurnParams) -> EventStream {
        let (sender, stream) = EventStream::channel(64);
        let llm = self.llm.clone();
        let max_rounds = self.max_rounds;

        tokio::spawn(async move {
            let Some(llm) = llm else {
                let _ = sender
                    .send(StreamEvent::error(AgentError::NoProvider.to_string()))
                    .await;
                return;
            };
            turn_loop(llm, agent, messages, params, 0, max_rounds, sender).await;
        });

        stream
    }

    /// Resume a turn paused for approval. The continuation has already been
    /// decoded and validated; approval requirements are re-derived from the
    /// live gate here, not read from the token or the client.
    pub fn resume(&self, continuation: Continuation, approved_ids: HashSet<String>) -> EventStream {
        let (sender, stream) = EventStream::channel(64);
        let llm = self.llm.clone();
        let max_rounds = self.max_rounds;

        tokio::spawn(async move {
            let Some(llm) = llm else {
                let _ = sender
                    .send(StreamEvent::error(AgentError::NoProvider.to_string()))
                    .await;
                return;
            };

            // Only calls without a recorded result are resolved here; auto
            // results captured before the pause are never re-run.
            let pending = continuation.pending_calls();
            let Continuation {
                agent,
                mut messages,
                params,
            } = continuation;

            let ctx = tool_context(&params, &llm);
            for call in &pending {
                // Calls that don't require approval should have run before
                // the pause, but tolerate them: execute rather than drop.
                let approved =
                    !tools::requires_approval(&call.name) || approved_ids.contains(&call.id);

                if approved {
                    if run_tool(call, &ctx, &mut messages, &sender).await.is_err() {
                        return;
                    }
                } else {
                    messages.push(Message::tool_declined(&call.id, &call.name));
                }
            }

            // The resolved batch closes out the round that paused.
            let start_round = params.rounds_used;
            turn_loop(llm, agent, messages, params, start_round, max_rounds, sender).await;
        });

        stream
    }
}

fn tool_context(params: &TurnParams, llm: &Arc<dyn LlmProvider>) -> ToolContext {
    ToolContext {
        job_title: params.job_title.clone(),
        location: params.location.clone(),
        llm: Some(llm.clone()),
    }
}

/// Execute one tool call, bracketed by its step events, and append the
/// result to the transcript. Err means the receiver hung up.
async fn run_tool(
    call: &ToolCall,
    ctx: &ToolContext,
    messages: &mut Vec<Message>,
    sender: &EventSender,
) -> Result<(), ()> {
    let step_id = format!("tool-{}", call.id);
    let label = format!("Running {}", call.name);

    if sender
        .send(StreamEvent::step(&step_id, &label, StepStatus::Active))
        .await
        .is_err()
    {
        return Err(());
    }

    let output = tools::execute(&call.name, &call.arguments, ctx);
    messages.push(Message::tool_result(&call.id, output));

    if sender
        .send(StreamEvent::step(&step_id, &label, StepStatus::Done))
        .await
        .is_err()
    {
        return Err(());
    }

    Ok(())
}

/// The generating/tool-running loop shared by new turns and resumes.
/// Emits exactly one terminal event before returning, unless the receiver
/// hangs up first.
async fn turn_loop(
    llm: Arc<dyn LlmProvider>,
    agent: AgentKind,
    mut messages: Vec<Message>,
    params: TurnParams,
    start_round: u32,
    max_rounds: u32,
    sender: EventSender,
) {
    let tool_definitions = tools::definitions_for(agent);
    let ctx = tool_context(&params, &llm);
    let mut full_text = String::new();
    let mut round = start_round;

    while round < max_rounds {
        let step_id = format!("agent-round-{}", round + 1);
        let step_label = format!("{} is thinking", agent.label());
        if sender
            .send(StreamEvent::step(&step_id, &step_label, StepStatus::Active))
            .await
            .is_err()
        {
            return;
        }

        let mut request_messages = vec![Message::system(instructions_for(agent))];
        request_messages.extend(messages.iter().cloned());

        let request = CompletionRequest {
            messages: request_messages,
            tools: if tool_definitions.is_empty() {
                None
            } else {
                Some(tool_definitions.clone())
            },
            stream: true,
            ..Default::default()
        };

        let mut stream = llm.complete_stream(request);
        let mut round_content = String::new();
        let mut accumulator = ToolCallAccumulator::new();

        while let Some(result) = stream.next().await {
            match result {
                Ok(chunk) => {
                    if !chunk.content.is_empty() {
                        round_content.push_str(&chunk.content);
                        full_text.push_str(&chunk.content);
                        if sender.send(StreamEvent::text(&chunk.content)).await.is_err() {
                            return;
                        }
                    }
                    for delta in &chunk.tool_calls {
                        accumulator.apply_delta(delta);
                    }
                }
                Err(e) => {
                    let _ = sender
                        .send(StreamEvent::step(&step_id, &step_label, StepStatus::Done))
                        .await;
                    let _ = sender.send(StreamEvent::error(e.to_string())).await;
                    return;
                }
            }
        }

        if sender
            .send(StreamEvent::step(&step_id, &step_label, StepStatus::Done))
            .await
            .is_err()
        {
            return;
        }

        round += 1;

        let calls = accumulator.build();
        if calls.is_empty() {
            break;
        }

        messages.push(Message::assistant_with_tools(&round_content, calls.clone()));

        // Auto-executing calls run first, in emission order; their results
        // land in the transcript before any pause, so a later resume never
        // re-runs them.
        for call in calls.iter().filter(|c| !tools::requires_approval(&c.name)) {
            if run_tool(call, &ctx, &mut messages, &sender).await.is_err() {
                return;
            }
        }

        let gated: Vec<ToolCall> = calls
            .iter()
            .filter(|c| tools::requires_approval(&c.name))
            .cloned()
            .collect();

        if !gated.is_empty() {
            let mut paused_params = params.clone();
            paused_params.rounds_used = round;
            let continuation = Continuation::new(agent, messages, paused_params);
            let event = match continuation.encode() {
                Ok(token) => StreamEvent::pending(gated, token),
                Err(e) => StreamEvent::error(format!("Failed to pause turn: {}", e)),
            };
            let _ = sender.send(event).await;
            return;
        }
    }

    let mut text = full_text.trim().to_string();
    if text.is_empty() {
        text = EMPTY_RESPONSE_PLACEHOLDER.to_string();
    }
    if let Some(disclaimer) = disclaimer_for(agent) {
        text.push_str(disclaimer);
    }

    let _ = sender.send(StreamEvent::done(text)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::error::{LlmError, LlmResult};
    use crate::agents::instructions::COMPLIANCE_DISCLAIMER;
    use crate::agents::llm::{
        CompletionRequest, CompletionResponse, FinishReason, LlmStream, StreamChunk, ToolCallDelta,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// One scripted model round.
    #[derive(Default, Clone)]
    struct Round {
        text_chunks: Vec<&'static str>,
        tool_calls: Vec<(&'static str, &'static str, serde_json::Value)>,
        fail: bool,
    }

    impl Round {
        fn text(chunks: &[&'static str]) -> Self {
            Round {
                text_chunks: chunks.to_vec(),
                ..Default::default()
            }
        }

        fn tools(calls: &[(&'static str, &'static str, serde_json::Value)]) -> Self {
            Round {
                tool_calls: calls.to_vec(),
                ..Default::default()
            }
        }
    }

    /// Provider that replays scripted rounds in order.
    struct ScriptedProvider {
        rounds: Mutex<Vec<Round>>,
    }

    impl ScriptedProvider {
        fn new(rounds: Vec<Round>) -> Arc<Self> {
            Arc::new(Self {
                rounds: Mutex::new(rounds),
            })
        }

        fn next_round(&self) -> Round {
            let mut rounds = self.rounds.lock().unwrap();
            if rounds.is_empty() {
                Round::text(&[])
            } else {
                rounds.remove(0)
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }

        async fn complete(&self, _request: CompletionRequest) -> LlmResult<CompletionResponse> {
            let round = self.next_round();
            Ok(CompletionResponse {
                message: Message::assistant(round.text_chunks.concat()),
                finish_reason: FinishReason::Stop,
            })
        }

        fn complete_stream(&self, _request: CompletionRequest) -> LlmStream {
            let (sender, stream) = LlmStream::channel(16);
            let round = self.next_round();

            tokio::spawn(async move {
                if round.fail {
                    let _ = sender
                        .send_error(LlmError::Api {
                            status: 500,
                            message: "scripted failure".to_string(),
                        })
                        .await;
                    return;
                }

                for chunk in &round.text_chunks {
                    let _ = sender.send(StreamChunk::text(*chunk)).await;
                }

                for (index, (id, name, args)) in round.tool_calls.iter().enumerate() {
                    let delta = ToolCallDelta::new(index)
                        .with_id(*id)
                        .with_name(*name)
                        .with_arguments(args.to_string());
                    let _ = sender.send(StreamChunk::tool_call(delta)).await;
                }

                let reason = if round.tool_calls.is_empty() {
                    FinishReason::Stop
                } else {
                    FinishReason::ToolCalls
                };
                let _ = sender.send(StreamChunk::finish(reason)).await;
            });

            stream
        }
    }

    fn orchestrator(rounds: Vec<Round>) -> TurnOrchestrator {
        TurnOrchestrator::new(Some(ScriptedProvider::new(rounds)), 10)
    }

    fn terminal(events: &[StreamEvent]) -> &StreamEvent {
        let terminals: Vec<&StreamEvent> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminals.len(), 1, "exactly one terminal event per request");
        assert!(
            events.last().unwrap().is_terminal(),
            "terminal event must close the stream"
        );
        terminals[0]
    }

    fn concat_text(events: &[StreamEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Text { content } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_plain_text_turn() {
        let orch = orchestrator(vec![Round::text(&["Hello", " ", "world"])]);
        let events = orch
            .run(
                AgentKind::Recruiting,
                vec![Message::user("hi")],
                TurnParams::default(),
            )
            .collect_all()
            .await;

        match terminal(&events) {
            StreamEvent::Done { text } => assert_eq!(text, "Hello world"),
            other => panic!("expected done, got {:?}", other),
        }
        assert_eq!(concat_text(&events).trim(), "Hello world");
    }

    #[tokio::test]
    async fn test_compliance_disclaimer_suffix() {
        let orch = orchestrator(vec![Round::text(&["Leave policy looks fine."])]);
        let events = orch
            .run(
                AgentKind::ComplianceAgent,
                vec![Message::user("review this")],
                TurnParams::default(),
            )
            .collect_all()
            .await;

        match terminal(&events) {
            StreamEvent::Done { text } => {
                assert!(text.starts_with("Leave policy looks fine."));
                assert!(text.ends_with(COMPLIANCE_DISCLAIMER));
                assert_eq!(
                    text.strip_suffix(COMPLIANCE_DISCLAIMER).unwrap(),
                    concat_text(&events).trim()
                );
            }
            other => panic!("expected done, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mixed_batch_pauses_with_auto_results_preserved() {
        let orch = orchestrator(vec![Round::tools(&[
            ("call_search", "search_candidates", json!({ "max_results": 2 })),
            (
                "call_mail",
                "send_outreach",
                json!({ "candidate_email": "jane@example.com", "subject": "Hi", "body": "Hello" }),
            ),
        ])]);

        let events = orch
            .run(
                AgentKind::Recruiting,
                vec![Message::user("find and contact candidates")],
                TurnParams::default(),
            )
            .collect_all()
            .await;

        let StreamEvent::PendingToolCalls { calls, continuation } = terminal(&events) else {
            panic!("expected pending_tool_calls terminal");
        };
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "send_outreach");

        // The auto-executed search result is already in the snapshot.
        let decoded = Continuation::decode(continuation).unwrap();
        let search_result = decoded
            .messages
            .iter()
            .find(|m| m.tool_call_id.as_deref() == Some("call_search"))
            .expect("auto-executed result preserved in continuation");
        assert!(search_result.content.contains("simulated"));
        assert_eq!(decoded.pending_calls()[0].id, "call_mail");

        // A step ran for the auto call but not for the gated one.
        assert!(events.iter().any(
            |e| matches!(e, StreamEvent::Step { id, .. } if id == "tool-call_search")
        ));
        assert!(!events.iter().any(
            |e| matches!(e, StreamEvent::Step { id, .. } if id == "tool-call_mail")
        ));

        // Resuming with approval resolves only the gated call; the auto
        // call's preserved result is not re-executed.
        let orch = orchestrator(vec![Round::text(&["All done."])]);
        let approved: HashSet<String> = ["call_mail".to_string()].into_iter().collect();
        let resume_events = orch.resume(decoded, approved).collect_all().await;

        assert!(resume_events.iter().any(
            |e| matches!(e, StreamEvent::Step { id, .. } if id == "tool-call_mail")
        ));
        assert!(!resume_events.iter().any(
            |e| matches!(e, StreamEvent::Step { id, .. } if id == "tool-call_search")
        ));
        match terminal(&resume_events) {
            StreamEvent::Done { text } => assert_eq!(text, "All done."),
            other => panic!("expected done, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resume_with_approval_executes_and_finishes() {
        let continuation = Continuation::new(
            AgentKind::Recruiting,
            vec![
                Message::user("contact jane"),
                Message::assistant_with_tools(
                    "",
                    vec![ToolCall::new(
                        "call_mail",
                        "send_outreach",
                        json!({ "candidate_email": "jane@example.com", "subject": "Hi" }),
                    )],
                ),
            ],
            TurnParams::default(),
        );

        let orch = orchestrator(vec![Round::text(&["Outreach sent."])]);
        let approved: HashSet<String> = ["call_mail".to_string()].into_iter().collect();
        let events = orch.resume(continuation, approved).collect_all().await;

        assert!(events.iter().any(
            |e| matches!(e, StreamEvent::Step { id, .. } if id == "tool-call_mail")
        ));
        match terminal(&events) {
            StreamEvent::Done { text } => assert_eq!(text, "Outreach sent."),
            other => panic!("expected done, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resume_decline_records_notice_and_continues() {
        let continuation = Continuation::new(
            AgentKind::Recruiting,
            vec![
                Message::user("contact jane"),
                Message::assistant_with_tools(
                    "",
                    vec![ToolCall::new(
                        "call_mail",
                        "send_outreach",
                        json!({ "candidate_email": "jane@example.com" }),
                    )],
                ),
            ],
            TurnParams::default(),
        );

        // After the decline, the model proposes a second gated call, pausing
        // again; its snapshot lets us inspect the recorded decline.
        let orch = orchestrator(vec![Round::tools(&[(
            "call_ats",
            "update_ats",
            json!({ "candidate_id": "c-1", "new_stage": "on-hold" }),
        )])]);

        let events = orch.resume(continuation, HashSet::new()).collect_all().await;

        let StreamEvent::PendingToolCalls { calls, continuation } = terminal(&events) else {
            panic!("expected a second approval pause");
        };
        assert_eq!(calls[0].name, "update_ats");

        let decoded = Continuation::decode(continuation).unwrap();
        let decline = decoded
            .messages
            .iter()
            .find(|m| m.tool_call_id.as_deref() == Some("call_mail"))
            .expect("decline notice recorded in transcript");
        assert!(decline.content.contains("declined"));
        // No execution step was emitted for the declined call.
        assert!(!events.iter().any(
            |e| matches!(e, StreamEvent::Step { id, .. } if id == "tool-call_mail")
        ));
    }

    #[tokio::test]
    async fn test_round_budget_terminates_turn() {
        // Every round proposes another auto tool call; the loop must stop
        // at the budget and still emit a single done terminal.
        let rounds: Vec<Round> = (0..20)
            .map(|_| Round::tools(&[("call_x", "search_candidates", json!({}))]))
            .collect();
        let orch = TurnOrchestrator::new(Some(ScriptedProvider::new(rounds)), 3);

        let events = orch
            .run(
                AgentKind::Recruiting,
                vec![Message::user("loop forever")],
                TurnParams::default(),
            )
            .collect_all()
            .await;

        match terminal(&events) {
            StreamEvent::Done { text } => {
                assert_eq!(text, EMPTY_RESPONSE_PLACEHOLDER);
            }
            other => panic!("expected done, got {:?}", other),
        }

        let thinking_steps = events
            .iter()
            .filter(|e| {
                matches!(e, StreamEvent::Step { id, status, .. }
                    if id.starts_with("agent-round-") && *status == StepStatus::Active)
            })
            .count();
        assert_eq!(thinking_steps, 3);
    }

    #[tokio::test]
    async fn test_unknown_tool_feeds_error_back_to_model() {
        let orch = orchestrator(vec![
            Round::tools(&[("call_bad", "frobnicate", json!({}))]),
            Round::text(&["That tool does not exist."]),
        ]);

        let events = orch
            .run(
                AgentKind::Recruiting,
                vec![Message::user("do the thing")],
                TurnParams::default(),
            )
            .collect_all()
            .await;

        // The unknown tool became tool output, not a stream error.
        match terminal(&events) {
            StreamEvent::Done { text } => assert_eq!(text, "That tool does not exist."),
            other => panic!("expected done, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generation_failure_is_error_terminal() {
        let orch = orchestrator(vec![Round {
            fail: true,
            ..Default::default()
        }]);

        let events = orch
            .run(
                AgentKind::Recruiting,
                vec![Message::user("hi")],
                TurnParams::default(),
            )
            .collect_all()
            .await;

        match terminal(&events) {
            StreamEvent::Error { message } => assert!(message.contains("scripted failure")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_provider_errors_immediately() {
        let orch = TurnOrchestrator::new(None, 10);
        let events = orch
            .run(
                AgentKind::Recruiting,
                vec![Message::user("hi")],
                TurnParams::default(),
            )
            .collect_all()
            .await;

        match terminal(&events) {
            StreamEvent::Error { message } => {
                assert!(message.contains("No generation capability"))
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resume_consumes_remaining_round_budget() {
        let mut params = TurnParams::default();
        params.rounds_used = 2;
        let continuation = Continuation::new(
            AgentKind::Recruiting,
            vec![
                Message::user("contact jane"),
                Message::assistant_with_tools(
                    "",
                    vec![ToolCall::new("call_mail", "send_outreach", json!({}))],
                ),
            ],
            params,
        );

        // Budget of 3 with 2 rounds used leaves one generation round.
        let rounds: Vec<Round> = (0..5)
            .map(|_| Round::tools(&[("call_x", "search_candidates", json!({}))]))
            .collect();
        let orch = TurnOrchestrator::new(Some(ScriptedProvider::new(rounds)), 3);

        let events = orch.resume(continuation, HashSet::new()).collect_all().await;
        let thinking_steps = events
            .iter()
            .filter(|e| {
                matches!(e, StreamEvent::Step { id, status, .. }
                    if id.starts_with("agent-round-") && *status == StepStatus::Active)
            })
            .count();
        assert_eq!(thinking_steps, 1);
        assert!(matches!(terminal(&events), StreamEvent::Done { .. }));
    }
}
