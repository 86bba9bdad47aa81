//! Tool registry, dispatcher, and approval gate
//!
//! The tool set is closed and known at process start. Tool bodies are
//! simulated: they synthesize a plausible structured result instead of
//! contacting a real candidate database, mail provider, calendar, or ATS.
//! The dispatcher contract is the interface boundary; production
//! integrations would replace the bodies without touching the callers.

mod recruiting;
mod sourcing;

use std::sync::Arc;

use serde_json::{json, Value};

use crate::agents::domain::{AgentKind, ToolDefinition};
use crate::agents::llm::LlmProvider;

/// The closed set of tools available to the recruiting agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    SearchCandidates,
    ScreenResume,
    SendOutreach,
    ScheduleInterview,
    UpdateAts,
    GetSourcingWorkflow,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::SearchCandidates,
        ToolName::ScreenResume,
        ToolName::SendOutreach,
        ToolName::ScheduleInterview,
        ToolName::UpdateAts,
        ToolName::GetSourcingWorkflow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SearchCandidates => "search_candidates",
            ToolName::ScreenResume => "screen_resume",
            ToolName::SendOutreach => "send_outreach",
            ToolName::ScheduleInterview => "schedule_interview",
            ToolName::UpdateAts => "update_ats",
            ToolName::GetSourcingWorkflow => "get_sourcing_workflow",
        }
    }

    pub fn parse(s: &str) -> Option<ToolName> {
        ToolName::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Whether executing this tool has side effects that need explicit user
    /// confirmation. Fixed at process start; never depends on arguments.
    pub fn requires_approval(&self) -> bool {
        match self {
            ToolName::SendOutreach | ToolName::ScheduleInterview | ToolName::UpdateAts => true,
            ToolName::SearchCandidates
            | ToolName::ScreenResume
            | ToolName::GetSourcingWorkflow => false,
        }
    }
}

/// Approval check by raw tool name. Unknown names never require approval;
/// they fail inside the dispatcher instead.
pub fn requires_approval(name: &str) -> bool {
    ToolName::parse(name).map_or(false, |t| t.requires_approval())
}

/// Ambient context threaded to tool executions.
#[derive(Clone, Default)]
pub struct ToolContext {
    /// Job title from the turn parameters, used as a search default
    pub job_title: Option<String>,
    /// Location from the turn parameters, used as a search default
    pub location: Option<String>,
    /// Generation capability, for tool bodies that may need it
    pub llm: Option<Arc<dyn LlmProvider>>,
}

/// Execute a tool by name. Never fails: unknown tools and malformed
/// arguments both come back as structured JSON the model can react to.
pub fn execute(name: &str, args: &Value, ctx: &ToolContext) -> String {
    let Some(tool) = ToolName::parse(name) else {
        return json!({ "error": format!("Unknown tool: {}", name) }).to_string();
    };

    let result = match tool {
        ToolName::SearchCandidates => recruiting::search_candidates(args, ctx),
        ToolName::ScreenResume => recruiting::screen_resume(args),
        ToolName::SendOutreach => recruiting::send_outreach(args),
        ToolName::ScheduleInterview => recruiting::schedule_interview(args),
        ToolName::UpdateAts => recruiting::update_ats(args),
        ToolName::GetSourcingWorkflow => sourcing::get_sourcing_workflow(args),
    };

    result.to_string()
}

/// Tool definitions offered to the model for a given agent. Only the
/// recruiting agent carries tools.
pub fn definitions_for(agent: AgentKind) -> Vec<ToolDefinition> {
    match agent {
        AgentKind::Recruiting => all_definitions(),
        _ => Vec::new(),
    }
}

fn all_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "search_candidates",
            "Search the candidate database for people matching a role and location.",
            json!({
                "type": "object",
                "properties": {
                    "job_title": { "type": "string", "description": "Role to search for" },
                    "location": { "type": "string", "description": "Location or 'remote'" },
                    "max_results": { "type": "integer", "description": "Max candidates to return (default 5, cap 20)" }
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            "screen_resume",
            "Screen a resume against job requirements and summarize fit.",
            json!({
                "type": "object",
                "properties": {
                    "resume_text": { "type": "string" },
                    "job_requirements": { "type": "string" }
                },
                "required": ["resume_text"]
            }),
        ),
        ToolDefinition::new(
            "send_outreach",
            "Send an outreach email to a candidate. Requires user approval.",
            json!({
                "type": "object",
                "properties": {
                    "candidate_email": { "type": "string" },
                    "subject": { "type": "string" },
                    "body": { "type": "string" }
                },
                "required": ["candidate_email", "subject", "body"]
            }),
        ),
        ToolDefinition::new(
            "schedule_interview",
            "Schedule an interview with a candidate. Requires user approval.",
            json!({
                "type": "object",
                "properties": {
                    "candidate_email": { "type": "string" },
                    "interviewer": { "type": "string" },
                    "date": { "type": "string", "description": "YYYY-MM-DD" },
                    "time": { "type": "string", "description": "HH:MM, 24h" },
                    "duration_minutes": { "type": "integer", "description": "Default 45" }
                },
                "required": ["candidate_email", "date", "time"]
            }),
        ),
        ToolDefinition::new(
            "update_ats",
            "Move a candidate to a new stage in the applicant tracking system. Requires user approval.",
            json!({
                "type": "object",
                "properties": {
                    "candidate_id": { "type": "string" },
                    "new_stage": { "type": "string", "description": "e.g. screening, interview, offer" },
                    "notes": { "type": "string" }
                },
                "required": ["candidate_id", "new_stage"]
            }),
        ),
        ToolDefinition::new(
            "get_sourcing_workflow",
            "Produce a step-by-step sourcing workflow for a role, including boolean search strings and an outreach sequence.",
            json!({
                "type": "object",
                "properties": {
                    "seniority": { "type": "string", "description": "Default 'senior'" },
                    "stack": { "type": "string", "description": "Tech stack or domain, default 'general software'" },
                    "work_model": { "type": "string", "description": "remote/hybrid/onsite, default 'hybrid'" },
                    "must_haves": { "type": "string", "description": "Comma-separated hard requirements" }
                },
                "required": []
            }),
        ),
    ]
}

// Defensive, field-level argument access. Arguments come from the model and
// may be missing, wrong-typed, or not an object at all; every field falls
// back to its documented default individually.

pub(crate) fn arg_str(args: &Value, key: &str, default: &str) -> String {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn arg_opt_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn arg_u64(args: &Value, key: &str, default: u64) -> u64 {
    args.get(key).and_then(Value::as_u64).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_partition() {
        for name in ["send_outreach", "schedule_interview", "update_ats"] {
            assert!(requires_approval(name), "{} should be gated", name);
        }
        for name in ["search_candidates", "screen_resume", "get_sourcing_workflow"] {
            assert!(!requires_approval(name), "{} should auto-execute", name);
        }
        assert!(!requires_approval("delete_everything"));
        assert!(!requires_approval(""));
    }

    #[test]
    fn test_unknown_tool_returns_structured_error() {
        let out = execute("frobnicate", &json!({}), &ToolContext::default());
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert!(parsed["error"]
            .as_str()
            .unwrap()
            .contains("Unknown tool: frobnicate"));
    }

    #[test]
    fn test_tool_name_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
        }
    }

    #[test]
    fn test_only_recruiting_carries_tools() {
        assert_eq!(definitions_for(AgentKind::Recruiting).len(), 6);
        assert!(definitions_for(AgentKind::ComplianceAgent).is_empty());
        assert!(definitions_for(AgentKind::Onboarding).is_empty());
    }

    #[test]
    fn test_arg_helpers_tolerate_bad_shapes() {
        let args = json!({ "max_results": "ten", "subject": 5 });
        assert_eq!(arg_u64(&args, "max_results", 5), 5);
        assert_eq!(arg_str(&args, "subject", ""), "");
        assert_eq!(arg_str(&Value::Null, "anything", "dflt"), "dflt");
        assert_eq!(arg_opt_str(&args, "missing"), None);
    }
}
