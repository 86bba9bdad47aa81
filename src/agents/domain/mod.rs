//! Domain types for the agent subsystem

mod agent;
mod event;
mod message;
mod tool_call;

pub use agent::{AgentFamily, AgentKind, RoutingDecision};
pub use event::{EventSender, EventStream, StepStatus, StreamEvent};
pub use message::{history_message, Message, Role};
pub use tool_call::{ToolCall, ToolDefinition};
