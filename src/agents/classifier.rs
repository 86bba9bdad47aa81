//! Two-tier agent classifier
//!
//! Tier 1 is deterministic keyword matching and handles the overwhelming
//! majority of traffic with no network access. Tier 2 asks the generation
//! capability to act as a strict JSON router and is only reached when tier 1
//! is inconclusive; every failure mode of tier 2 degrades to the general HR
//! assistant rather than erroring the turn.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::domain::{AgentKind, Message, RoutingDecision};
use crate::agents::llm::{CompletionRequest, LlmProvider};

/// Which chat surface a request came from. Selects the heuristic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSurface {
    /// Top-level assistant chat (recruiting / onboarding / L&D)
    #[default]
    Assistant,
    /// Document-centric compliance chat
    DocumentReview,
}

/// Domain vocabulary gating the compliance-family specializations.
const COMPLIANCE_KEYWORDS: &[&str] = &[
    "compliance",
    "compliant",
    "policy",
    "policies",
    "handbook",
    "gdpr",
    "hipaa",
    "iso",
    "soc 2",
    "soc2",
    "audit",
    "regulation",
    "regulatory",
    "working time",
    "overtime",
    "minimum wage",
    "data protection",
    "privacy",
    "leave",
    "pto",
    "vacation",
    "sick day",
    "termination",
];

/// Phrases indicating "what does the document say".
const DOC_LOOKUP_PHRASES: &[&str] = &[
    "what does the document",
    "what does the handbook",
    "what does the policy",
    "what does it say",
    "according to the document",
    "according to the handbook",
    "where does it say",
    "does the document say",
    "does the handbook say",
    "handbook say",
    "policy say",
    "document say",
    "summarize the document",
    "summarise the document",
];

/// Phrases indicating a mapping to control frameworks.
const CONTROL_MAPPING_PHRASES: &[&str] = &[
    "iso 9001",
    "iso 27001",
    "iso9001",
    "iso27001",
    "soc 2",
    "soc2",
    "control mapping",
    "map to controls",
    "map this process",
    "map our process",
    "risk control",
    "risk controls",
    "controls",
];

const RECRUITING_PHRASES: &[&str] = &[
    "recruit",
    "hiring",
    "hire",
    "candidate",
    "sourcing",
    "outreach",
    "interview",
    "job description",
    "job post",
    "applicant",
    "ats",
    "talent pipeline",
    "resume",
    "cv",
    "headcount",
];

const ONBOARDING_PHRASES: &[&str] = &[
    "onboard",
    "new hire",
    "new starter",
    "new employee",
    "first day",
    "first week",
    "orientation",
    "welcome plan",
    "30-60-90",
    "ramp-up",
    "probation",
    "buddy",
];

const LEARNING_PHRASES: &[&str] = &[
    "learning",
    "training",
    "course",
    "upskill",
    "reskill",
    "development plan",
    "l&d",
    "mentorship",
    "mentor",
    "certification",
    "skill gap",
    "career growth",
    "workshop",
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Routes a user message to an agent.
pub struct Classifier {
    llm: Option<Arc<dyn LlmProvider>>,
}

impl Classifier {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { llm }
    }

    /// Classify a message. Always terminates in a valid decision; the
    /// fallback tier absorbs its own failures.
    pub async fn classify(
        &self,
        surface: ChatSurface,
        message: &str,
        history: &[Message],
        has_document: bool,
    ) -> RoutingDecision {
        match surface {
            ChatSurface::Assistant => classify_assistant(message),
            ChatSurface::DocumentReview => {
                match classify_document(message, has_document) {
                    Some(decision) => decision,
                    // Document attached but no domain keyword matched.
                    None => self.fallback(message, history, has_document).await,
                }
            }
        }
    }

    /// Tier 2: ask the model to route, constrained to the known agent set.
    async fn fallback(
        &self,
        message: &str,
        history: &[Message],
        has_document: bool,
    ) -> RoutingDecision {
        let Some(llm) = &self.llm else {
            return RoutingDecision::with_reason(AgentKind::GeneralHrAssistant, "no-api-key");
        };

        let ids: Vec<&str> = AgentKind::ALL.iter().map(|a| a.as_str()).collect();
        let instructions = format!(
            "You are a router for an HR assistant. Reply with strict JSON only, no prose: \
             {{\"agent\": \"<id>\", \"reason\": \"<short reason>\"}} where <id> is one of: {}. \
             The user {} a document attached.",
            ids.join(", "),
            if has_document { "has" } else { "does not have" },
        );

        let mut messages = vec![Message::system(instructions)];
        // Recent history only; old turns rarely change the routing answer.
        let start = history.len().saturating_sub(10);
        messages.extend(history[start..].iter().cloned());
        messages.push(Message::user(message));

        let request = CompletionRequest {
            messages,
            max_tokens: Some(200),
            temperature: Some(0.0),
            ..Default::default()
        };

        let response = match llm.complete(request).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Router fallback failed: {}", e);
                return RoutingDecision::with_reason(AgentKind::GeneralHrAssistant, "fallback");
            }
        };

        let content = response.message.content.trim().to_string();
        if content.is_empty() {
            return RoutingDecision::with_reason(AgentKind::GeneralHrAssistant, "empty-response");
        }

        parse_router_json(&content).unwrap_or_else(|| {
            RoutingDecision::with_reason(AgentKind::GeneralHrAssistant, "fallback")
        })
    }
}

/// Tier 1 for the top-level assistant chat. Deterministic; never defers to
/// the model.
///
/// Precedence when lists overlap: recruiting-only wins, any onboarding match
/// resolves to onboarding (a new-hire-focused message should win when
/// ambiguous), then learning, then the compliance default.
pub fn classify_assistant(message: &str) -> RoutingDecision {
    let lower = message.trim().to_lowercase();
    if lower.is_empty() {
        return RoutingDecision::with_reason(
            AgentKind::ComplianceAgent,
            "empty message; defaulting with low confidence",
        );
    }

    let recruiting = contains_any(&lower, RECRUITING_PHRASES);
    let onboarding = contains_any(&lower, ONBOARDING_PHRASES);

    if recruiting && !onboarding {
        let mut decision =
            RoutingDecision::with_reason(AgentKind::Recruiting, "matched recruiting vocabulary");
        decision.required_questions = vec![
            "What role are you hiring for?".to_string(),
            "What location, or is the role remote?".to_string(),
        ];
        return decision;
    }
    if onboarding {
        return RoutingDecision::with_reason(AgentKind::Onboarding, "matched onboarding vocabulary");
    }
    if contains_any(&lower, LEARNING_PHRASES) {
        return RoutingDecision::with_reason(
            AgentKind::LearningDevelopment,
            "matched learning vocabulary",
        );
    }

    RoutingDecision::with_reason(AgentKind::ComplianceAgent, "no specialization matched")
}

/// Tier 1 for the document-review chat. `None` means inconclusive and the
/// caller should consult tier 2.
fn classify_document(message: &str, has_document: bool) -> Option<RoutingDecision> {
    // Document presence is a hard precondition for every specialization.
    if !has_document {
        return Some(RoutingDecision::with_reason(
            AgentKind::GeneralHrAssistant,
            "no document attached",
        ));
    }

    let lower = message.trim().to_lowercase();
    if lower.is_empty() {
        return Some(RoutingDecision::with_reason(
            AgentKind::ComplianceAgent,
            "empty message; defaulting with low confidence",
        ));
    }

    if !contains_any(&lower, COMPLIANCE_KEYWORDS) {
        return None;
    }

    if contains_any(&lower, DOC_LOOKUP_PHRASES) {
        return Some(RoutingDecision::with_reason(
            AgentKind::PolicyDocAgent,
            "document lookup phrasing",
        ));
    }
    if contains_any(&lower, CONTROL_MAPPING_PHRASES) {
        return Some(RoutingDecision::with_reason(
            AgentKind::RiskControlsAgent,
            "control mapping phrasing",
        ));
    }

    Some(RoutingDecision::with_reason(
        AgentKind::ComplianceAgent,
        "compliance vocabulary",
    ))
}

/// Parse the fallback router's JSON reply. Tolerates code fences.
fn parse_router_json(content: &str) -> Option<RoutingDecision> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    let agent = AgentKind::parse(value.get("agent")?.as_str()?)?;
    let reason = value
        .get("reason")
        .and_then(|r| r.as_str())
        .unwrap_or("model-routed")
        .to_string();
    Some(RoutingDecision::with_reason(agent, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(message: &str, has_document: bool) -> AgentKind {
        classify_document(message, has_document)
            .expect("tier 1 should be conclusive for this input")
            .agent
    }

    #[test]
    fn test_no_document_always_general() {
        for message in [
            "is our overtime policy gdpr compliant?",
            "map this process to iso 9001 controls",
            "what does the handbook say about leave?",
            "",
        ] {
            assert_eq!(doc(message, false), AgentKind::GeneralHrAssistant);
        }
    }

    #[test]
    fn test_control_mapping_routes_to_risk_controls() {
        assert_eq!(
            doc("map this process to iso 9001 controls", true),
            AgentKind::RiskControlsAgent
        );
    }

    #[test]
    fn test_handbook_lookup_routes_to_policy_doc() {
        assert_eq!(
            doc("what does the handbook say about leave?", true),
            AgentKind::PolicyDocAgent
        );
    }

    #[test]
    fn test_compliance_vocabulary_default() {
        assert_eq!(
            doc("is this overtime policy compliant?", true),
            AgentKind::ComplianceAgent
        );
    }

    #[test]
    fn test_document_tier_inconclusive_without_keywords() {
        assert!(classify_document("tell me a story about turtles", true).is_none());
    }

    #[test]
    fn test_assistant_recruiting() {
        let decision = classify_assistant("help me write an outreach email to a candidate");
        assert_eq!(decision.agent, AgentKind::Recruiting);
        assert!(!decision.required_questions.is_empty());
    }

    #[test]
    fn test_assistant_onboarding_wins_over_recruiting() {
        // "new hire" + "interview" matches both lists; onboarding wins.
        let decision = classify_assistant("plan the first interview week for our new hire");
        assert_eq!(decision.agent, AgentKind::Onboarding);
    }

    #[test]
    fn test_assistant_learning() {
        let decision = classify_assistant("suggest a certification path for our engineers");
        assert_eq!(decision.agent, AgentKind::LearningDevelopment);
    }

    #[test]
    fn test_assistant_default_and_empty() {
        assert_eq!(
            classify_assistant("how is the weather").agent,
            AgentKind::ComplianceAgent
        );
        let empty = classify_assistant("   ");
        assert_eq!(empty.agent, AgentKind::ComplianceAgent);
        assert!(empty.reason.unwrap().contains("low confidence"));
    }

    #[tokio::test]
    async fn test_fallback_without_provider_degrades() {
        let classifier = Classifier::new(None);
        let decision = classifier
            .classify(ChatSurface::DocumentReview, "tell me about turtles", &[], true)
            .await;
        assert_eq!(decision.agent, AgentKind::GeneralHrAssistant);
        assert_eq!(decision.reason.as_deref(), Some("no-api-key"));
    }

    #[test]
    fn test_parse_router_json_variants() {
        let d = parse_router_json(r#"{"agent":"policy_doc_agent","reason":"doc question"}"#)
            .unwrap();
        assert_eq!(d.agent, AgentKind::PolicyDocAgent);

        let fenced = "```json\n{\"agent\":\"recruiting\"}\n```";
        assert_eq!(parse_router_json(fenced).unwrap().agent, AgentKind::Recruiting);

        assert!(parse_router_json(r#"{"agent":"nonsense"}"#).is_none());
        assert!(parse_router_json("not json").is_none());
    }
}
