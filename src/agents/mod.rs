//! Multi-agent HR assistant core: routing, tool orchestration, streaming

pub mod classifier;
pub mod continuation;
pub mod domain;
pub mod error;
pub mod instructions;
pub mod llm;
pub mod orchestrator;
pub mod tools;
