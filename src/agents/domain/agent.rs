//! Agent identifiers and routing decisions

use serde::{Deserialize, Serialize};

/// The closed set of agents that can own a conversational turn.
///
/// Exactly one agent is active per turn; it determines the instruction
/// text and the tool set offered to the model for that turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// General-purpose HR assistant; also the safe fallback agent
    GeneralHrAssistant,
    /// Compliance questions against an attached document
    ComplianceAgent,
    /// "What does the document say" lookups
    PolicyDocAgent,
    /// Mapping processes to ISO/SOC 2 controls
    RiskControlsAgent,
    /// Recruiting workflows (the only agent with tools)
    Recruiting,
    /// New-hire onboarding plans
    Onboarding,
    /// Learning & development guidance
    LearningDevelopment,
}

/// Which chat surface an agent belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentFamily {
    /// Document-centric compliance chat
    Compliance,
    /// Top-level assistant chat
    TopLevel,
}

impl AgentKind {
    /// All known agents, in a fixed order.
    pub const ALL: [AgentKind; 7] = [
        AgentKind::GeneralHrAssistant,
        AgentKind::ComplianceAgent,
        AgentKind::PolicyDocAgent,
        AgentKind::RiskControlsAgent,
        AgentKind::Recruiting,
        AgentKind::Onboarding,
        AgentKind::LearningDevelopment,
    ];

    /// Wire identifier for this agent.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::GeneralHrAssistant => "general_hr_assistant",
            AgentKind::ComplianceAgent => "compliance_agent",
            AgentKind::PolicyDocAgent => "policy_doc_agent",
            AgentKind::RiskControlsAgent => "risk_controls_agent",
            AgentKind::Recruiting => "recruiting",
            AgentKind::Onboarding => "onboarding",
            AgentKind::LearningDevelopment => "learning_development",
        }
    }

    /// Parse a wire identifier.
    pub fn parse(s: &str) -> Option<AgentKind> {
        AgentKind::ALL.iter().copied().find(|a| a.as_str() == s)
    }

    pub fn family(&self) -> AgentFamily {
        match self {
            AgentKind::GeneralHrAssistant
            | AgentKind::ComplianceAgent
            | AgentKind::PolicyDocAgent
            | AgentKind::RiskControlsAgent => AgentFamily::Compliance,
            AgentKind::Recruiting | AgentKind::Onboarding | AgentKind::LearningDevelopment => {
                AgentFamily::TopLevel
            }
        }
    }

    /// Human-readable label used in step events.
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::GeneralHrAssistant => "General HR Assistant",
            AgentKind::ComplianceAgent => "Compliance Agent",
            AgentKind::PolicyDocAgent => "Policy Document Agent",
            AgentKind::RiskControlsAgent => "Risk & Controls Agent",
            AgentKind::Recruiting => "Recruiting Agent",
            AgentKind::Onboarding => "Onboarding Agent",
            AgentKind::LearningDevelopment => "Learning & Development Agent",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a user message.
///
/// Produced once per turn, before any model call, and never re-evaluated
/// mid-turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub agent: AgentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Follow-up prompts the UI should ask before starting the turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_questions: Vec<String>,
}

impl RoutingDecision {
    pub fn new(agent: AgentKind) -> Self {
        Self {
            agent,
            reason: None,
            required_questions: Vec::new(),
        }
    }

    pub fn with_reason(agent: AgentKind, reason: impl Into<String>) -> Self {
        Self {
            agent,
            reason: Some(reason.into()),
            required_questions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_round_trip() {
        for agent in AgentKind::ALL {
            assert_eq!(AgentKind::parse(agent.as_str()), Some(agent));
        }
        assert_eq!(AgentKind::parse("unknown_agent"), None);
    }

    #[test]
    fn test_families() {
        assert_eq!(
            AgentKind::GeneralHrAssistant.family(),
            AgentFamily::Compliance
        );
        assert_eq!(AgentKind::Recruiting.family(), AgentFamily::TopLevel);
    }

    #[test]
    fn test_serde_identifiers() {
        let v = serde_json::to_value(AgentKind::RiskControlsAgent).unwrap();
        assert_eq!(v, serde_json::json!("risk_controls_agent"));
    }
}
